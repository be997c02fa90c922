use miette::Result;
use tokio_util::sync::CancellationToken;

use centralpub_ops::ProjectContext;

pub async fn exec(id: &str, wait: bool, cancel: &CancellationToken) -> Result<()> {
    let ctx = ProjectContext::discover(&super::current_dir()?)?;
    let outcome = centralpub_ops::ops_release::release(&ctx, id, wait, cancel).await?;
    super::report(&outcome);
    Ok(())
}
