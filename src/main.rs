use anyhow::Context;
use churnscope::config::Settings;
use churnscope::render;
use churnscope::sample::SampleTable;
use churnscope::session::{CycleReport, Interaction, Session};
use churnscope::{ArtifactLoader, ChurnClassifier};
use log::{LevelFilter, info};
use std::io::{self, Write};

const HELP: &str = "\
Commands:
  set <field> <value>   change one control (e.g. `set age 52`, `set geography Spain`)
  <field>=<value>       same as `set`
  reset                 restore the default customer
  refresh               predict again with the current values
  controls              show the control panel
  sample                show the sample data
  help                  show this help
  exit                  quit";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("CHURNSCOPE_LOG", "warn"))
        .init();

    let settings = Settings::default();

    println!("📦 Loading model from {:?}...", settings.artifact_path);
    let loader = ArtifactLoader::new(&settings.artifact_path);
    let mut session = Session::open(&loader)
        .with_context(|| "❌ Cannot start the churn predictor without a model")?;
    println!(
        "✅ Loaded {} model",
        session.context().model().type_name()
    );

    let sample = match SampleTable::from_csv(&settings.sample_path, settings.sample_rows) {
        Ok(table) => Some(table),
        Err(err) => {
            info!("no sample data at {:?}: {err}", settings.sample_path);
            None
        }
    };
    if let Some(table) = &sample {
        println!("{}", render::sample(table));
    }

    println!("{}", render::controls(&session.form().record()));
    let report = session.interact(Interaction::Refresh)?;
    show(&report, &settings);

    loop {
        print!("Command (`help` for options): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            "controls" => {
                println!("{}", render::controls(&session.form().record()));
                continue;
            }
            "sample" => {
                match &sample {
                    Some(table) => println!("{}", render::sample(table)),
                    None => println!("No sample data available."),
                }
                continue;
            }
            _ => {}
        }

        let report = Interaction::parse(line).and_then(|action| session.interact(action));
        match report {
            Ok(report) => show(&report, &settings),
            Err(err) => println!("⚠️ {err}"),
        }
    }

    Ok(())
}

fn show(report: &CycleReport, settings: &Settings) {
    if let Some(adjustment) = &report.adjustment {
        if adjustment.clamped {
            println!(
                "↔️ {} adjusted to {} (outside slider range)",
                adjustment.field, adjustment.value
            );
        }
    }
    println!("{}", render::record(&report.record));
    match &report.outcome {
        Ok(prediction) => println!("{}", render::prediction(prediction, settings.chart_width)),
        Err(err) => println!("❌ {}", render::cycle_error(err)),
    }
}
