//! CLI tests for the meshnet command.
//!
//! These run without root: everything that would touch the network goes
//! through `change --dry-run`.

use assert_cmd::Command;
use predicates::prelude::*;

fn meshnet_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_meshnet"))
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        meshnet_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Mesh network emulation"))
            .stdout(predicate::str::contains("--ignore-shaping"))
            .stdout(predicate::str::contains("--block-arp"))
            .stdout(predicate::str::contains("--block-multicast"));
    }

    #[test]
    fn test_version() {
        meshnet_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("meshnet"));
    }

    #[test]
    fn test_invalid_subcommand() {
        meshnet_cmd()
            .arg("invalid_command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn test_ignore_tc_alias() {
        meshnet_cmd()
            .args(["--ignore-tc", "change", "none", "none", "--dry-run"])
            .assert()
            .success();
    }
}

mod change_command {
    use super::*;

    #[test]
    fn test_change_help() {
        meshnet_cmd()
            .args(["change", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--dry-run"));
    }

    #[test]
    fn test_change_requires_both_topologies() {
        meshnet_cmd()
            .args(["change", "none"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("required"));
    }

    #[test]
    fn test_none_to_none() {
        meshnet_cmd()
            .args(["change", "none", "none", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes needed"));
    }

    #[test]
    fn test_create_pair() {
        meshnet_cmd()
            .args(["change", "none", &fixture("pair.json"), "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("+ switch"))
            .stdout(predicate::str::contains("+ node a"))
            .stdout(predicate::str::contains("+ link b <-> a"))
            .stdout(predicate::str::contains("ip netns add ns-b"))
            .stdout(predicate::str::contains(
                "ip link add name v-b-a type veth peer name v-a-b",
            ))
            .stdout(predicate::str::contains("arp off").not());
    }

    #[test]
    fn test_teardown_pair() {
        meshnet_cmd()
            .args(["change", &fixture("pair.json"), "none", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("- link b <-> a"))
            .stdout(predicate::str::contains("- switch"))
            .stdout(predicate::str::contains("ip netns delete switch"));
    }

    #[test]
    fn test_unchanged() {
        let pair = fixture("pair.json");
        meshnet_cmd()
            .args(["change", &pair, &pair, "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes needed"));
    }

    #[test]
    fn test_shaping_update() {
        meshnet_cmd()
            .args([
                "change",
                &fixture("pair.json"),
                &fixture("pair-shaped.json"),
                "--dry-run",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("~ link b <-> a"))
            .stdout(predicate::str::contains(
                "ip netns exec switch tc qdisc replace dev v-b-a root netem delay 10ms",
            ));
    }

    #[test]
    fn test_ignore_shaping() {
        meshnet_cmd()
            .args([
                "change",
                &fixture("pair.json"),
                &fixture("pair-shaped.json"),
                "--dry-run",
                "--ignore-shaping",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("tc qdisc").not());
    }

    #[test]
    fn test_block_arp_and_multicast() {
        meshnet_cmd()
            .args([
                "--block-arp",
                "--block-multicast",
                "change",
                "none",
                &fixture("pair.json"),
                "--dry-run",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("ip link set dev br-a arp off"))
            .stdout(predicate::str::contains("ip link set dev v-a-b multicast off"));
    }

    #[test]
    fn test_numeric_identifiers() {
        meshnet_cmd()
            .args(["change", "none", &fixture("numbered.json"), "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("+ node 12"))
            .stdout(predicate::str::contains("ip netns add ns-3"))
            .stdout(predicate::str::contains(
                "tc qdisc replace dev v-3-7 root netem loss 2%",
            ));
    }

    #[test]
    fn test_invalid_topology() {
        meshnet_cmd()
            .args(["change", "none", &fixture("self-loop.json"), "--dry-run"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error: invalid topology"))
            .stderr(predicate::str::contains("self-loop.json"))
            .stderr(predicate::str::contains("undefined state").not());
    }

    #[test]
    fn test_missing_file() {
        meshnet_cmd()
            .args(["change", "none", &fixture("missing.json"), "--dry-run"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error:"));
    }
}

mod logging {
    use super::*;

    #[test]
    fn test_quiet_by_default() {
        meshnet_cmd()
            .env_remove("RUST_LOG")
            .args(["change", "none", &fixture("pair.json"), "--dry-run"])
            .assert()
            .success()
            .stderr(predicate::str::contains("creating switch namespace").not());
    }

    #[test]
    fn test_verbose_logs_steps() {
        meshnet_cmd()
            .env_remove("RUST_LOG")
            .args(["--verbose", "change", "none", &fixture("pair.json"), "--dry-run"])
            .assert()
            .success()
            .stderr(predicate::str::contains("creating switch namespace"))
            .stderr(predicate::str::contains("create link b <-> a"));
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        meshnet_cmd()
            .env("RUST_LOG", "info")
            .args(["change", "none", &fixture("pair.json"), "--dry-run"])
            .assert()
            .success()
            .stderr(predicate::str::contains("creating switch namespace"));
    }
}

mod list_command {
    use super::*;

    #[test]
    fn test_list_help() {
        meshnet_cmd()
            .args(["list", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--json"));
    }
}

mod clear_command {
    use super::*;

    #[test]
    fn test_clear_rejects_arguments() {
        meshnet_cmd()
            .args(["clear", "extra"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}
