//! Load and render a component fragment.

use anime_fragments::MountPoint;
use anyhow::{bail, Result};

use super::FragmentArgs;
use crate::context::Context;

/// Run the fragment command.
pub async fn run(args: FragmentArgs, ctx: &Context) -> Result<()> {
    let loader = ctx.fragment_loader()?;
    let data = args.data.as_deref().map(|json| loader.parse_data(json));

    ctx.output.debug(&format!(
        "Probing {}",
        loader.probe_urls(&args.name).join(", ")
    ));

    let mut target = MountPoint::new(args.target.as_str());
    let mounted = loader
        .inject_component(&args.name, &mut target, data.as_ref())
        .await;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "name": args.name,
            "target": target.id(),
            "loaded": target.is_loaded(),
            "html": target.inner_html(),
        }));
    } else {
        println!("{}", target.inner_html());
    }

    if !mounted {
        bail!("Component '{}' failed to load", args.name);
    }
    Ok(())
}
