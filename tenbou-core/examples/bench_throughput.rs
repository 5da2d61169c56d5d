use std::time::Instant;

use tenbou_core::simulator::{simulate_single_game, BatchConfig, BatchSimulator, GameResult, Policy};

fn report(title: &str, results: &[GameResult], elapsed: std::time::Duration, threads: usize) {
    let total_actions: u64 = results.iter().map(|r| r.total_actions as u64).sum();
    let rounds: u64 = results.iter().map(|r| r.rounds_played as u64).sum();
    let draws: u64 = results.iter().map(|r| r.draws as u64).sum();
    let gps = results.len() as f64 / elapsed.as_secs_f64();

    println!("=== {} ({} games) ===", title, results.len());
    println!("Time:             {:.2?}", elapsed);
    println!("Avg actions/game: {:.0}", total_actions as f64 / results.len() as f64);
    println!("Avg rounds/game:  {:.1}", rounds as f64 / results.len() as f64);
    println!("Draw rate:        {:.1}%", 100.0 * draws as f64 / rounds.max(1) as f64);
    println!("Games/sec:        {:.1}", gps);
    println!("Games/hour/core:  {:.0}", gps * 3600.0 / threads as f64);
    println!();
}

fn main() -> anyhow::Result<()> {
    let num_cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let config = BatchConfig {
        num_games: 100,
        session_seed: 2024,
        policy: Policy::Random,
        ..Default::default()
    };

    // warmup
    simulate_single_game(0, &config)?;

    let single = BatchSimulator::new(Some(1))?;
    let start = Instant::now();
    let results = single.run_batch(&config)?;
    report("SINGLE CORE", &results, start.elapsed(), 1);

    let multi = BatchSimulator::new(Some(num_cpus))?;
    let config = BatchConfig {
        num_games: 1000,
        ..config
    };
    let start = Instant::now();
    let results = multi.run_batch(&config)?;
    report(&format!("ALL CORES, {} threads", num_cpus), &results, start.elapsed(), num_cpus);
    Ok(())
}
