use miette::Result;
use tokio_util::sync::CancellationToken;

use centralpub_ops::outcome::ensure_succeeded;
use centralpub_ops::ProjectContext;

pub async fn exec(id: &str, wait: bool, cancel: &CancellationToken) -> Result<()> {
    let ctx = ProjectContext::discover(&super::current_dir()?)?;
    let current = centralpub_ops::ops_status::status(&ctx, id, wait, cancel).await?;

    println!("{}: {}", current.deployment_id, current.deployment_state);
    if let Some(name) = &current.deployment_name {
        println!("  name: {name}");
    }
    for purl in current.purls.iter().flatten() {
        println!("  {purl}");
    }
    ensure_succeeded(&current)
}
