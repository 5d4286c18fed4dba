#![no_main]
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use solg::msbuild::Project;

fuzz_target!(|data: &[u8]| {
    if let Ok(project) = Project::from_reader(data) {
        let _ = project.to_raw(Path::new("/src/fuzz.csproj"));
    }
});
