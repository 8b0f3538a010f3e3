//! Panic payload formatting helpers.
//!
//! Scenario bodies signal assertion failures by panicking. The worker catches
//! the unwind and renders the payload with [`panic_message`] so the failure
//! can be stored and replayed like any other scenario error.

use std::any::Any;

/// Formats a panic payload into a readable message.
///
/// String payloads are extracted directly and numbers are rendered with
/// `Display`. Any other payload is described as opaque, naming its
/// [`TypeId`](std::any::TypeId).
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::panic_message;
/// use std::any::Any;
///
/// let payload: Box<dyn Any + Send> = Box::new("boom");
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    macro_rules! try_downcast {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return value.to_string();
                }
            )*
        };
    }

    try_downcast!(&str, String, i32, u32, i64, u64, isize, usize, f32, f64);
    format!("opaque panic payload (TypeId({:?}))", payload.type_id())
}
