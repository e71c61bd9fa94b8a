use anyhow::Result;
use console::style;
use strum::IntoEnumIterator;

use abacus::providers::configs::{KnownModel, DEFAULT_MODEL};

pub fn execute() -> Result<()> {
    for model in KnownModel::iter() {
        let id = model.id();
        let marker = if id == DEFAULT_MODEL { " (default)" } else { "" };
        println!(
            "{}{}\n  {}",
            style(&id).bold().cyan(),
            style(marker).dim(),
            model.description()
        );
    }
    println!(
        "{}",
        style("Any other model id is passed to the API unchanged via MODEL_NAME.").dim()
    );
    Ok(())
}
