//! Run record lookup.

use storyreel::{
    FileSystemMetadataStore, JsonError, MetadataStore, RunId, StoryreelConfig, StoryreelResult,
};

/// Print the saved record of `run_id` as JSON.
pub async fn show_run(config: &StoryreelConfig, run_id: &str) -> StoryreelResult<()> {
    let store = FileSystemMetadataStore::new(&config.output.dir);
    let state = store.load(&RunId::new(run_id)).await?;
    let json = serde_json::to_string_pretty(&state).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{json}");
    Ok(())
}
