use super::*;

#[test]
fn mine_prints_block() {
    let mined = CommandBuilder::new("--min-pow-score 0.05 mine --parallelism 2")
        .run_and_deserialize_output();

    let block_id = mined["block_id"].as_str().unwrap();
    assert!(block_id.starts_with("0x"));
    pretty_assert_eq!(block_id.len(), 66);

    assert!(mined["nonce"].is_u64());
    assert!(mined["size"].as_u64().unwrap() > 8);
    assert!(mined["score"].as_f64().unwrap() >= 0.05);
}

#[test]
fn mine_times_out() {
    let stderr = CommandBuilder::new(
        "--min-pow-score 0.05 mine --parallelism 1 --target-score 1e30 --timeout 0.2",
    )
    .expect_failure();

    assert!(stderr.contains("no nonce found"), "unexpected stderr: {stderr}");
}

#[test]
fn target_below_min_pow_score_is_rejected() {
    let stderr =
        CommandBuilder::new("--min-pow-score 2 mine --target-score 1").expect_failure();

    assert!(
        stderr.contains("below the min PoW score"),
        "unexpected stderr: {stderr}"
    );
}
