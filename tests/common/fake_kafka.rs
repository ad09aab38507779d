//! Stand-in perf-test scripts.
//!
//! Both scripts read `--topic` from their arguments. Topic `broken` exits
//! non-zero, topic `slow` sleeps long enough to hit a short timeout, and
//! topic `garbled` succeeds without printing a summary.

use std::fs;
use std::path::{Path, PathBuf};

pub const PRODUCER_SCRIPT: &str = "kafka-producer-perf-test.sh";
pub const CONSUMER_SCRIPT: &str = "kafka-consumer-perf-test.sh";

const TOPIC_SCAN: &str = r#"topic=""
while [ $# -gt 0 ]; do
  case "$1" in
    --topic) topic="$2"; shift 2 ;;
    *) shift ;;
  esac
done
case "$topic" in
  broken) echo "org.apache.kafka.common.errors.TimeoutException" >&2; exit 1 ;;
  slow) sleep 30 ;;
  garbled) echo "nothing useful here"; exit 0 ;;
esac
"#;

const PRODUCER_BODY: &str = r#"echo "1000 records sent, 512.5 records/sec (0.50 MB/sec), 2.50 ms avg latency, 30.00 ms max latency, 2 ms 50th, 4 ms 95th."
"#;

const CONSUMER_BODY: &str = r#"echo "start.time, end.time, data.consumed.in.MB, MB.sec, data.consumed.in.nMsg, nMsg.sec, rebalance.time.ms, fetch.time.ms, fetch.MB.sec, fetch.nMsg.sec"
echo "2026-03-01 10:00:00:000, 2026-03-01 10:00:01:000, 0.9766, 1.2500, 1000, 1280.0, 300, 700, 1.3951, 1428.5714"
"#;

/// Directory holding both scripts.
pub struct FakeKafka {
    pub bin_dir: PathBuf,
}

impl FakeKafka {
    pub fn install(root: &Path) -> Self {
        let bin_dir = root.join("kafka-bin");
        fs::create_dir_all(&bin_dir).expect("bin dir");
        write_script(&bin_dir.join(PRODUCER_SCRIPT), PRODUCER_BODY);
        write_script(&bin_dir.join(CONSUMER_SCRIPT), CONSUMER_BODY);
        Self { bin_dir }
    }

    pub fn bin_arg(&self) -> String {
        self.bin_dir.display().to_string()
    }
}

fn write_script(path: &Path, body: &str) {
    let script = format!("#!/bin/sh\n{TOPIC_SCAN}{body}");
    fs::write(path, script).expect("write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).expect("script metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("chmod script");
    }
}
