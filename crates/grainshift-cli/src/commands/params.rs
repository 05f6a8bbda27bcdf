//! Parameter listing.

use std::path::PathBuf;

use clap::Args;
use grainshift_params::{Parameter, Params};

#[derive(Args)]
pub struct ParamsArgs {
    /// Engine config (TOML) deciding which optional parameters exist
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let params = Params::new(&config.layout);
    println!("{} parameters\n", params.len());
    for param in params.iter() {
        println!("{}", describe(param));
    }
    Ok(())
}

fn describe(param: &Parameter) -> String {
    let step = param.range().step();
    let stepping = if step > 0.0 {
        format!(", step {step}")
    } else {
        String::new()
    };
    format!(
        "  {:<14} {:<14} {} .. {}{stepping}  (default {})\n      {}",
        param.id().id_string(),
        param.name(),
        param.text(0.0),
        param.text(1.0),
        param.text(param.default_value()),
        param.id().tooltip(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grainshift_params::{ParamId, ParamLayout};

    #[test]
    fn describes_range_and_default() {
        let params = Params::new(&ParamLayout::default());
        let mix = params.get(ParamId::Mix).unwrap();
        let line = describe(mix);
        assert!(line.contains("mix"));
        assert!(line.contains("0 %"));
        assert!(line.contains("(default 100 %)"));
    }

    #[test]
    fn full_layout_lists_more_params() {
        assert!(Params::new(&ParamLayout::full()).len() > Params::new(&ParamLayout::default()).len());
    }
}
