use miette::Result;
use tokio_util::sync::CancellationToken;

use centralpub_ops::ops_publish::PublishOptions;
use centralpub_ops::ProjectContext;

pub async fn exec(options: &PublishOptions, cancel: &CancellationToken) -> Result<()> {
    let ctx = ProjectContext::discover(&super::current_dir()?)?;
    let outcome = centralpub_ops::ops_publish::publish(&ctx, options, cancel).await?;
    super::report(&outcome);
    Ok(())
}
