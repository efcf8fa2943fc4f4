use std::path::PathBuf;

use super::init_service;

#[derive(Debug, Clone)]
pub struct ExplainInput {
    pub query: String,
    pub catalog: Option<PathBuf>,
}

/// Strategy for printing the tokens, pattern and suggestions of a query
/// without retrieving anything.
#[derive(Debug, Clone, Copy)]
pub struct ExplainStrategy;

impl super::CommandStrategy for ExplainStrategy {
    type Input = ExplainInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let service = init_service(input.catalog).await?;
        let analysis = service.analyze(&input.query).await;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        Ok(())
    }
}
