//! Scoped fault boundary.
//!
//! Runs a future so that a panic raised while polling it comes back as a
//! [`Fault`] value instead of unwinding further. The panic-site stack is
//! recorded by a process-wide panic hook into a thread-local slot, because by
//! the time `catch_unwind` returns the panicking frames are gone.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::future::{poll_fn, Future};
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::sync::Once;
use std::task::Poll;

use crate::error::{AppError, BoxError, ErrorCode, StackTrace};

/// Frames kept for a recovered panic.
pub const PANIC_STACK_DEPTH: usize = 64;

/// Rendering used when the panic payload is neither a string nor an error.
const OPAQUE_PAYLOAD: &str = "<non-string panic payload>";

static HOOK: Once = Once::new();

thread_local! {
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_SITE: Cell<Option<PanicSite>> = const { Cell::new(None) };
}

struct PanicSite {
    location: Option<String>,
    stack: StackTrace,
}

/// A panic converted into a value.
#[derive(Debug)]
pub struct Fault {
    raw: String,
    error: AppError,
    location: Option<String>,
    stack: StackTrace,
}

impl Fault {
    /// Normalize a `catch_unwind` payload.
    ///
    /// Never panics, whatever the payload type.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let (raw, error) = normalize(payload);
        let (location, stack) = match PANIC_SITE.try_with(Cell::take).ok().flatten() {
            Some(site) => (site.location, site.stack),
            None => (None, StackTrace::capture(PANIC_STACK_DEPTH)),
        };
        Self {
            raw,
            error,
            location,
            stack,
        }
    }

    /// Text of the original panic value.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }

    pub fn into_error(self) -> AppError {
        self.error
    }

    /// `file:line:col` of the panic, when the hook saw it.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Stack at the panic site, or at recovery if the hook was bypassed.
    pub fn stack(&self) -> &StackTrace {
        &self.stack
    }
}

fn normalize(payload: Box<dyn Any + Send>) -> (String, AppError) {
    let payload = match payload.downcast::<AppError>() {
        Ok(err) => return (err.to_string(), *err),
        Err(other) => other,
    };
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return (err.to_string(), AppError::wrap(*err, ErrorCode::Unknown, "panic")),
        Err(other) => other,
    };
    let payload = match payload.downcast::<std::io::Error>() {
        Ok(err) => return (err.to_string(), AppError::wrap(*err, ErrorCode::Unknown, "panic")),
        Err(other) => other,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(msg) => return ((*msg).to_string(), AppError::new(ErrorCode::Unknown, *msg)),
        Err(other) => other,
    };
    match payload.downcast::<String>() {
        Ok(msg) => (
            (*msg).clone(),
            AppError::new(ErrorCode::Unknown, *msg),
        ),
        Err(_) => (
            OPAQUE_PAYLOAD.to_string(),
            AppError::new(ErrorCode::Unknown, format!("unknown panic: {OPAQUE_PAYLOAD}")),
        ),
    }
}

/// Install the recording panic hook. Idempotent.
///
/// Panics outside any boundary are forwarded to the previously installed hook.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let inside = BOUNDARY_DEPTH.try_with(Cell::get).unwrap_or(0) > 0;
            if !inside {
                previous(info);
                return;
            }
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                stack: StackTrace::from_backtrace(&Backtrace::force_capture(), PANIC_STACK_DEPTH),
            };
            let _ = PANIC_SITE.try_with(|slot| slot.set(Some(site)));
        }));
    });
}

struct BoundaryScope;

impl BoundaryScope {
    fn enter() -> Self {
        let _ = BOUNDARY_DEPTH.try_with(|depth| depth.set(depth.get() + 1));
        BoundaryScope
    }
}

impl Drop for BoundaryScope {
    fn drop(&mut self) {
        let _ = BOUNDARY_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Poll `future` inside a fault boundary.
///
/// Returns `Err(Fault)` if any poll panics; the future is not polled again.
pub async fn run<F>(future: F) -> Result<F::Output, Fault>
where
    F: Future,
{
    install_panic_hook();
    let mut future = pin!(future);

    poll_fn(move |cx| {
        let _scope = BoundaryScope::enter();
        match panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx))) {
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(Fault::from_payload(payload))),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_output_through() {
        let out = run(async { 41 + 1 }).await.unwrap();
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn recovers_str_panic_after_suspension() {
        let fault = run(async {
            tokio::task::yield_now().await;
            panic!("simulated crash");
        })
        .await
        .unwrap_err();

        assert_eq!(fault.raw(), "simulated crash");
        assert_eq!(fault.error().to_string(), "simulated crash");
        assert_eq!(fault.error().code(), ErrorCode::Unknown);
        assert!(fault
            .location()
            .is_some_and(|loc| loc.contains("fault_boundary.rs")));
    }

    #[tokio::test]
    async fn recovers_formatted_panic() {
        let fault = run(async {
            let id = 7;
            panic!("user {id} vanished");
        })
        .await
        .unwrap_err();
        assert_eq!(fault.raw(), "user 7 vanished");
    }

    #[tokio::test]
    async fn keeps_classified_error_payload() {
        let fault = run(async {
            panic::panic_any(AppError::not_found("row 9"));
        })
        .await
        .unwrap_err();
        assert_eq!(fault.error().code(), ErrorCode::NotFound);
        assert_eq!(fault.raw(), "row 9");
    }

    #[tokio::test]
    async fn wraps_io_error_payload() {
        let fault = run(async {
            panic::panic_any(std::io::Error::other("disk gone"));
        })
        .await
        .unwrap_err();
        assert_eq!(fault.raw(), "disk gone");
        assert!(fault.error().cause().is_some());
    }

    #[tokio::test]
    async fn renders_opaque_payload() {
        let fault = run(async {
            panic::panic_any(404_u32);
        })
        .await
        .unwrap_err();
        assert_eq!(fault.raw(), OPAQUE_PAYLOAD);
        assert!(fault.error().to_string().starts_with("unknown panic"));
    }

    #[tokio::test]
    async fn boundary_depth_resets_after_fault() {
        let _ = run(async { panic!("first") }).await;
        assert_eq!(BOUNDARY_DEPTH.with(Cell::get), 0);
        assert!(run(async { "second" }).await.is_ok());
    }
}
