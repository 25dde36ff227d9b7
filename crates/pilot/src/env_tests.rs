// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_rank_vars() {
    for name in RANK_VARS {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn rank_prefers_own_variable() {
    clear_rank_vars();
    std::env::set_var("PMI_RANK", "7");
    std::env::set_var("RP_RANK", "3");
    assert_eq!(rank(), Some(3));
    clear_rank_vars();
}

#[test]
#[serial]
fn rank_falls_back_to_launcher_variables() {
    clear_rank_vars();
    std::env::set_var("SLURM_PROCID", "12");
    assert_eq!(rank(), Some(12));
    clear_rank_vars();
}

#[test]
#[serial]
fn unparsable_rank_is_skipped() {
    clear_rank_vars();
    std::env::set_var("RP_RANK", "zero");
    std::env::set_var("OMPI_COMM_WORLD_RANK", "1");
    assert_eq!(rank(), Some(1));
    clear_rank_vars();
    assert_eq!(rank(), None);
}

#[test]
#[serial]
fn core_count_reads_override() {
    std::env::set_var("ATHENA_PROC_NUMBER", "8");
    assert_eq!(core_count(), Some(8));
    std::env::set_var("ATHENA_PROC_NUMBER", "eight");
    assert_eq!(core_count(), None);
    std::env::remove_var("ATHENA_PROC_NUMBER");
}

#[test]
#[serial]
fn pack_retry_delay_in_milliseconds() {
    std::env::set_var("RP_PACK_RETRY_DELAY_MS", "250");
    assert_eq!(pack_retry_delay(), Some(Duration::from_millis(250)));
    std::env::remove_var("RP_PACK_RETRY_DELAY_MS");
    assert_eq!(pack_retry_delay(), None);
}

#[test]
fn hostname_is_never_empty() {
    assert!(!hostname().is_empty());
}
