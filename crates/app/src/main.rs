mod app;

use anyhow::Result;

use crate::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::new();
    app.init()?;
    app.run(std::env::args().skip(1).collect()).await?;

    Ok(())
}
