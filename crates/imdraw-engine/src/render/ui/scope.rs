/// Runs `f` inside validation and out-of-memory error scopes.
///
/// Errors raised by the device while `f` runs are returned here instead of
/// reaching the device's uncaptured-error handler, which panics by default.
/// Scopes are per thread; `f` must issue its device calls on this thread.
pub(super) fn capture<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    // Innermost scope first.
    let validation_err = pollster::block_on(validation.pop());
    let oom_err = pollster::block_on(oom.pop());

    match validation_err.or(oom_err) {
        Some(err) => {
            log::error!("gpu error captured: {err}");
            Err(err)
        }
        None => Ok(value),
    }
}
