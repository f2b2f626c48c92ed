mod app;
mod data;
mod output;
mod session;

use anyhow::Result;

use app::AnalyzerApp;

fn main() -> Result<()> {
    env_logger::init();

    let mut app = AnalyzerApp::new();
    app.run()
}
