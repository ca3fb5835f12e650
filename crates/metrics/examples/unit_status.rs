//! E2E demo of unit metrics with a live skew timer.
//!
//! Simulates a running work unit: a periodic task ticks the skew timer
//! while progress reports arrive and the status path reads estimates. All
//! call sites share one estimator behind a per-unit lock.

use std::sync::Arc;
use std::time::Duration;

use gridbot_core::SEC_PER_DAY;
use gridbot_data::JsonData;
use gridbot_metrics::UnitMetrics;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    println!("=== Gridbot Unit Metrics Demo ===\n");

    let data = JsonData::new(json!({
        "wu": {"estimate": 120},
        "assignment": {
            "credit": 4000,
            "timeout": SEC_PER_DAY,
            "deadline": 2 * SEC_PER_DAY,
        },
        "request": {"time": chrono::Utc::now().to_rfc3339()},
    }));
    println!("[OK] Assignment snapshot loaded\n");

    let metrics = Arc::new(Mutex::new(UnitMetrics::default()));
    metrics.lock().await.process_started();
    println!("[OK] Compute process started\n");

    // Periodic skew detection, as the owning agent would run it
    let timer = {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            loop {
                tick.tick().await;
                metrics.lock().await.skew_timer();
            }
        })
    };

    // Simulate sparse progress reports from the compute engine
    for done in [5u64, 20, 40] {
        tokio::time::sleep(Duration::from_secs(2)).await;

        let mut m = metrics.lock().await;
        m.update_known_progress(done, 100);

        let progress = m.estimated_progress(&data, 0, 0.0);
        let eta = m.eta(&data, 0, 0.0);
        let credit = m.credit_estimate(&data, eta);
        let ppd = m.ppd(credit, m.run_time_estimate(&data));

        println!(
            "progress {:5.1}%  run time {:4}s  eta {:4}s  credit {:5}  ppd {}",
            progress * 100.0,
            m.run_time(0),
            eta,
            credit,
            ppd,
        );
    }

    timer.abort();

    let final_run_time = metrics.lock().await.run_time(0);
    metrics.lock().await.process_ended(final_run_time);
    println!("\n[OK] Process ended after {}s", final_run_time);

    Ok(())
}
