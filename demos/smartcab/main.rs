use std::{error::Error, fs, path::Path};

use smartcab::{
    algo::{QTableAgent, QTableAgentConfig},
    gym::{SmartcabWorld, WorldConfig},
};

const NUM_TRIALS: u32 = 100;

fn main() -> Result<(), Box<dyn Error>> {
    // Forwards the agent's `log` records; `RUST_LOG=debug` shows every step
    tracing_subscriber::fmt::init();

    let path = Path::new("demos/smartcab");

    let mut env = SmartcabWorld::new(WorldConfig::default())?;
    let mut agent = QTableAgent::new(QTableAgentConfig::default())?;

    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    let mut header = vec!["trial"];
    header.extend(env.report.keys());
    header.push("epsilon");
    wtr.write_record(&header)?;

    let mut successes = 0;
    for i in 0..NUM_TRIALS {
        let epsilon = agent.epsilon();
        let trial = agent.go(&mut env)?;
        if trial.reached {
            successes += 1;
        }

        let mut record = vec![i.to_string()];
        record.extend(env.report.take().into_iter().map(|(_, v)| v.to_string()));
        record.push(epsilon.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;

    println!(
        "reached the destination in {successes}/{NUM_TRIALS} trials, learned {} state-action values",
        agent.len()
    );

    Ok(())
}
