#![no_main]
use libfuzzer_sys::fuzz_target;
use machines_core::Route;

fuzz_target!(|data: &str| {
    // A parsed route re-serializes to a path that parses to the same route.
    if let Some(route) = Route::parse(data) {
        assert_eq!(Route::parse(&route.path()), Some(route));
    }
});
