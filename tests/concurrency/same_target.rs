//! Many writers racing on one target: every rename is atomic, so the final content is
//! exactly one writer's payload and no temp files survive.

use crate::common::{strays, with_temp_root, writer};
use stagedwrite::WriteRequest;

const WRITERS: usize = 8;
const ROUNDS: usize = 10;

fn payload(i: usize) -> Vec<u8> {
    // Distinct lengths as well as bytes, so a mixture would be visible either way.
    vec![b'a' + u8::try_from(i).unwrap(); 1024 * (i + 1)]
}

#[test]
fn last_rename_wins_without_mixing() {
    let td = with_temp_root();
    let target = td.path().join("shared");
    let w = writer();
    let payloads: Vec<Vec<u8>> = (0..WRITERS).map(payload).collect();
    std::thread::scope(|s| {
        for p in &payloads {
            let w = &w;
            let target = &target;
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    w.write(WriteRequest::new(target).bytes(p)).unwrap();
                }
            });
        }
        // Readers observe whole payloads only.
        s.spawn(|| {
            for _ in 0..200 {
                if let Ok(seen) = std::fs::read(&target) {
                    assert!(payloads.contains(&seen), "torn read of {} bytes", seen.len());
                }
            }
        });
    });
    let fin = std::fs::read(&target).unwrap();
    assert!(payloads.contains(&fin));
    assert!(strays(td.path(), &["shared"]).is_empty());
}
