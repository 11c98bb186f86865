//! labelkit CLI - Command line interface for labeling projects.
//!
//! Plain project JSON is read from and written to local files; `save` stores
//! the encrypted project file in the project's target storage.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use labelkit_common::{Asset, AssetId, Connection, ExportFormat, Project, ProjectId, Tag};
use labelkit_crypto::{SecurityToken, TokenStore};
use labelkit_project::{
    ExportAssetState, ProjectService, ServiceConfig, JSON_EXPORT_PROVIDER_TYPE, PROJECT_VERSION,
};
use labelkit_storage::{LocalProvider, StorageProvider, LOCAL_PROVIDER_TYPE};

const TAG_COLORS: &[&str] = &["#5db300", "#e81123", "#6917aa", "#015cda", "#4894fe", "#6b6b6b"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "labelkit")]
#[command(about = "labelkit - Labeling project management")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Security token store (JSON).
    #[arg(short, long, default_value = "tokens.json")]
    tokens: PathBuf,

    /// Service configuration (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage security tokens.
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Create a plain project file over local folders.
    New {
        /// Project name.
        #[arg(short, long)]
        name: String,

        /// Name of the security token protecting the project.
        #[arg(long)]
        token: String,

        /// Folder holding the assets.
        #[arg(short, long)]
        source: PathBuf,

        /// Folder receiving project and metadata files.
        #[arg(long)]
        target: PathBuf,

        /// Tags to define, in order.
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Assets included in exports: "all", "visited", or "tagged".
        #[arg(long, default_value = "visited")]
        export_state: String,

        /// Output file for the plain project.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt a plain project and save it to its target storage.
    Save {
        /// Plain project file.
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Load an encrypted project from a local folder.
    Load {
        /// Folder holding the project file.
        #[arg(short, long)]
        folder: PathBuf,

        /// Project name.
        #[arg(short, long)]
        name: String,

        /// Output file for the plain project.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete a project and its asset metadata from its target storage.
    Delete {
        /// Plain project file.
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Delete a tag from the project and every asset.
    DeleteTag {
        /// Plain project file, updated in place.
        #[arg(short, long)]
        project: PathBuf,

        /// Tag to delete.
        #[arg(long)]
        tag: String,
    },

    /// Rename a tag in the project and every asset.
    RenameTag {
        /// Plain project file, updated in place.
        #[arg(short, long)]
        project: PathBuf,

        /// Current tag name.
        #[arg(long)]
        from: String,

        /// New tag name.
        #[arg(long)]
        to: String,
    },

    /// Run the project's export provider.
    Export {
        /// Plain project file.
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Check whether a folder already holds another project with this name.
    CheckDuplicate {
        /// Plain project file.
        #[arg(short, long)]
        project: PathBuf,

        /// Folder holding existing project files.
        #[arg(short, long)]
        folder: PathBuf,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Generate a new random token and add it to the store.
    Generate {
        /// Token name.
        #[arg(short, long)]
        name: String,
    },

    /// List token names in the store.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let service = build_service(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Token { command } => match command {
            TokenCommands::Generate { name } => cmd_token_generate(&cli.tokens, &name).await,
            TokenCommands::List => cmd_token_list(&cli.tokens).await,
        },

        Commands::New {
            name,
            token,
            source,
            target,
            tags,
            export_state,
            output,
        } => cmd_new(&name, &token, &source, &target, &tags, &export_state, &output).await,

        Commands::Save { project } => cmd_save(&service, &cli.tokens, &project).await,

        Commands::Load {
            folder,
            name,
            output,
        } => cmd_load(&service, &cli.tokens, &folder, &name, &output).await,

        Commands::Delete { project } => cmd_delete(&service, &project).await,

        Commands::DeleteTag { project, tag } => cmd_delete_tag(&service, &project, &tag).await,

        Commands::RenameTag { project, from, to } => {
            cmd_rename_tag(&service, &project, &from, &to).await
        }

        Commands::Export { project } => cmd_export(&service, &project).await,

        Commands::CheckDuplicate { project, folder } => {
            cmd_check_duplicate(&service, &project, &folder).await
        }
    }
}

/// Create the project service, applying a configuration file if given.
async fn build_service(config: Option<&Path>) -> Result<ProjectService> {
    let service = ProjectService::with_default_providers();
    match config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config = ServiceConfig::from_json(&json).context("Invalid service config")?;
            debug!(?config, "Loaded service config");
            Ok(service.with_config(config)?)
        }
        None => Ok(service),
    }
}

async fn read_tokens(path: &Path) -> Result<TokenStore> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read token store {}", path.display()))?;
    TokenStore::from_json(&json).context("Invalid token store")
}

async fn write_tokens(path: &Path, tokens: &TokenStore) -> Result<()> {
    tokio::fs::write(path, tokens.to_json()?)
        .await
        .with_context(|| format!("Failed to write token store {}", path.display()))
}

async fn read_project(path: &Path) -> Result<Project> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read project {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid project file {}", path.display()))
}

async fn write_project(path: &Path, project: &Project) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write project {}", path.display()))
}

fn local_connection(name: &str, folder: &Path) -> Connection {
    Connection::new(name, LOCAL_PROVIDER_TYPE, json!({ "folderPath": folder.to_string_lossy() }))
}

/// Build assets for the image files among `file_names`.
///
/// The file name is the asset id, so files sharing a stem stay distinct.
fn image_assets(source: &Path, file_names: Vec<String>) -> Result<Vec<Asset>> {
    let mut assets = Vec::new();
    for file_name in file_names {
        let is_image = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !is_image {
            continue;
        }
        let id = AssetId::new(file_name.as_str())
            .with_context(|| format!("Invalid asset name {}", file_name))?;
        let asset_path = source.join(&file_name);
        assets.push(Asset::new(id, file_name.as_str(), asset_path.to_string_lossy()));
    }
    Ok(assets)
}

/// Generate a token and add it to the store, creating the store if needed.
async fn cmd_token_generate(tokens_path: &Path, name: &str) -> Result<()> {
    let mut tokens = if tokens_path.exists() {
        read_tokens(tokens_path).await?
    } else {
        TokenStore::new()
    };

    tokens
        .insert(SecurityToken::generate(name))
        .context("Failed to add token")?;
    write_tokens(tokens_path, &tokens).await?;

    println!("Token generated: {}", name);
    println!("  Store: {}", tokens_path.display());

    Ok(())
}

async fn cmd_token_list(tokens_path: &Path) -> Result<()> {
    let tokens = read_tokens(tokens_path).await?;

    if tokens.is_empty() {
        println!("No tokens.");
    } else {
        for name in tokens.names() {
            println!("  {}", name);
        }
    }

    Ok(())
}

/// Create a plain project over local folders.
///
/// Image files found in the source folder become the project's assets.
async fn cmd_new(
    name: &str,
    token: &str,
    source: &Path,
    target: &Path,
    tags: &[String],
    export_state: &str,
    output: &Path,
) -> Result<()> {
    info!("Creating project: {}", name);

    let asset_state: ExportAssetState = serde_json::from_value(json!(export_state))
        .context("Invalid export state. Use: all, visited, or tagged")?;

    let mut project = Project {
        id: Some(ProjectId::generate()),
        name: name.to_string(),
        version: PROJECT_VERSION.to_string(),
        description: None,
        security_token: token.to_string(),
        source_connection: local_connection("Source", source),
        target_connection: local_connection("Target", target),
        export_format: Some(ExportFormat {
            provider_type: JSON_EXPORT_PROVIDER_TYPE.to_string(),
            provider_options: json!({ "assetState": asset_state }).into(),
        }),
        tags: tags
            .iter()
            .zip(TAG_COLORS.iter().cycle())
            .map(|(tag, color)| Tag::new(tag.as_str(), *color))
            .collect(),
        assets: Default::default(),
        last_visited_asset_id: None,
        auto_save: true,
    };

    let source_storage = LocalProvider::new(source).context("Failed to open source folder")?;
    for asset in image_assets(source, source_storage.list_files(None).await?)? {
        project.add_asset(asset);
    }

    write_project(output, &project).await?;

    println!("Project created successfully!");
    println!("  ID: {}", project.id.as_ref().map(|id| id.as_str()).unwrap_or_default());
    println!("  Assets: {}", project.assets.len());
    println!("  Tags: {}", project.tags.len());
    println!("  File: {}", output.display());

    Ok(())
}

/// Encrypt and save a plain project.
async fn cmd_save(service: &ProjectService, tokens_path: &Path, project_path: &Path) -> Result<()> {
    let project = read_project(project_path).await?;
    let tokens = read_tokens(tokens_path).await?;
    let token = tokens
        .get(&project.security_token)
        .context("Project security token not found")?;

    service
        .save(&project, token)
        .await
        .context("Failed to save project")?;

    println!("Project saved: {}", service.config().project_file_name(&project.name));

    Ok(())
}

/// Load and decrypt a project file.
async fn cmd_load(
    service: &ProjectService,
    tokens_path: &Path,
    folder: &Path,
    name: &str,
    output: &Path,
) -> Result<()> {
    info!("Loading project {} from {}", name, folder.display());

    let tokens = read_tokens(tokens_path).await?;
    let project = service
        .open(&local_connection("Target", folder), name, &tokens)
        .await
        .context("Failed to load project")?;

    write_project(output, &project).await?;

    println!("Project loaded: {}", project.name);
    println!("  Assets: {}", project.assets.len());
    println!("  File: {}", output.display());

    Ok(())
}

async fn cmd_delete(service: &ProjectService, project_path: &Path) -> Result<()> {
    let project = read_project(project_path).await?;

    service
        .delete(&project)
        .await
        .context("Failed to delete project")?;

    println!("Project deleted: {} ({} asset files)", project.name, project.assets.len());

    Ok(())
}

/// Delete a tag everywhere and drop its definition.
async fn cmd_delete_tag(service: &ProjectService, project_path: &Path, tag: &str) -> Result<()> {
    info!("Deleting tag: {}", tag);

    let mut project = read_project(project_path).await?;
    let updated = service
        .delete_tag(&project, tag)
        .await
        .context("Failed to delete tag")?;

    if project.remove_tag(tag) {
        write_project(project_path, &project).await?;
    }

    println!("Tag deleted: {} ({} assets updated)", tag, updated.len());

    Ok(())
}

/// Rename a tag everywhere and in its definition.
async fn cmd_rename_tag(service: &ProjectService, project_path: &Path, from: &str, to: &str) -> Result<()> {
    info!("Renaming tag {} to {}", from, to);

    let mut project = read_project(project_path).await?;
    let updated = service
        .update_tag(&project, from, to)
        .await
        .context("Failed to rename tag")?;

    if project.rename_tag(from, to) {
        write_project(project_path, &project).await?;
    }

    println!("Tag renamed: {} -> {} ({} assets updated)", from, to, updated.len());

    Ok(())
}

async fn cmd_export(service: &ProjectService, project_path: &Path) -> Result<()> {
    let project = read_project(project_path).await?;

    let result = service
        .export(&project)
        .await
        .context("Failed to export project")?;

    println!("Export complete: {} assets", result.asset_count);
    for file in &result.files {
        println!("  {}", file);
    }

    Ok(())
}

/// Compare a project against every project file in a folder.
///
/// Only names and ids are compared, so the stored files are not decrypted.
async fn cmd_check_duplicate(service: &ProjectService, project_path: &Path, folder: &Path) -> Result<()> {
    let project = read_project(project_path).await?;
    let storage = LocalProvider::new(folder).context("Failed to open folder")?;

    let extension = &service.config().project_file_extension;
    let mut existing = Vec::new();
    for file_name in storage.list_files(Some(extension.as_str())).await? {
        let json = storage.read_text(&file_name).await?;
        match serde_json::from_str::<Project>(&json) {
            Ok(other) => existing.push(other),
            Err(e) => debug!(file = %file_name, error = %e, "Skipping unreadable project file"),
        }
    }

    if service.is_duplicate(&project, &existing) {
        anyhow::bail!("A project named '{}' already exists in {}", project.name, folder.display());
    }

    println!("No duplicate among {} projects.", existing.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_assets_keep_files_sharing_a_stem() {
        let names = vec![
            "a.jpg".to_string(),
            "a.PNG".to_string(),
            "notes.txt".to_string(),
        ];

        let assets = image_assets(Path::new("/in"), names).unwrap();

        let ids: Vec<&str> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a.jpg", "a.PNG"]);
        assert_eq!(assets[0].path, Path::new("/in").join("a.jpg").to_string_lossy());
    }
}
