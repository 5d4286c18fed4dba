#![no_main]
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use solg::ExistingIds;

fuzz_target!(|data: &str| {
    let ids = ExistingIds::parse_str(data, Path::new("/src"));
    let _ = ids.solution_id();
});
