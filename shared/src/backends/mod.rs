cfg_if! {
    if #[cfg(not(target_arch = "wasm32"))] {
        mod native;
        pub use self::native::*;
    } else {
        compile_error!("stockpile_shared requires a native target with a monotonic std clock");
    }
}
