//! Sample records written to an empty store on first start.

use crate::error::CoreResult;
use crate::model::{ConfigLanguage, Snippet, ToolConfig, ToolKind};
use crate::repository::Repository;
use tracing::info;

fn snippet(
    id: &str,
    title: &str,
    language: &str,
    tags: &[&str],
    code: &str,
    updated_at: &str,
) -> Snippet {
    Snippet {
        id: id.to_string(),
        title: title.to_string(),
        language: language.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        code: code.to_string(),
        description: String::new(),
        updated_at: updated_at.to_string(),
    }
}

pub fn snippets() -> Vec<Snippet> {
    vec![
        snippet(
            "1",
            "Debounce function",
            "TypeScript",
            &["utility", "timing"],
            "export function debounce<T extends (...args: any[]) => void>(fn: T, wait = 300) {\n  let t: ReturnType<typeof setTimeout> | undefined\n  return (...args: Parameters<T>) => {\n    clearTimeout(t)\n    t = setTimeout(() => fn(...args), wait)\n  }\n}\n",
            "2d",
        ),
        snippet(
            "2",
            "Tailwind center container",
            "CSS",
            &["tailwind", "layout"],
            ".container {\n  @apply mx-auto flex max-w-3xl items-center justify-center;\n}\n",
            "3d",
        ),
        snippet(
            "3",
            "Next.js route handler",
            "TS",
            &["nextjs", "api"],
            "export async function GET(request: Request) {\n  return Response.json({ ok: true })\n}\n",
            "1w",
        ),
        snippet(
            "4",
            "Prisma pagination",
            "TS",
            &["prisma", "database"],
            "const page = await prisma.snippet.findMany({\n  skip: (n - 1) * size,\n  take: size,\n  orderBy: { updatedAt: 'desc' },\n})\n",
            "2w",
        ),
    ]
}

pub fn configs() -> Vec<ToolConfig> {
    vec![
        ToolConfig {
            id: "a".to_string(),
            name: "VSCode settings.json".to_string(),
            tool: ToolKind::Vscode,
            file_path: "settings.json".to_string(),
            language: ConfigLanguage::Json,
            is_public: true,
            description: String::new(),
            content: "{\n  \"editor.fontSize\": 14,\n  \"files.exclude\": { \"**/.DS_Store\": true }\n}"
                .to_string(),
            updated_at: "5d".to_string(),
        },
        ToolConfig {
            id: "b".to_string(),
            name: "Neovim init.lua".to_string(),
            tool: ToolKind::Neovim,
            file_path: "init.lua".to_string(),
            language: ConfigLanguage::Lua,
            is_public: true,
            description: String::new(),
            content: "-- init.lua\nvim.o.number = true\nvim.o.tabstop = 2\n".to_string(),
            updated_at: "1w".to_string(),
        },
        // No shell entry in the tool list, so zsh is filed under "other".
        ToolConfig {
            id: "c".to_string(),
            name: "Zsh .zshrc".to_string(),
            tool: ToolKind::Other,
            file_path: ".zshrc".to_string(),
            language: ConfigLanguage::Json,
            is_public: false,
            description: String::new(),
            content: "export EDITOR=nvim\nalias ll='ls -lah'\n".to_string(),
            updated_at: "3w".to_string(),
        },
    ]
}

/// Fill each empty collection with the sample records.
///
/// Returns true if anything was written.
pub async fn seed_if_empty(
    snippet_repo: &dyn Repository<Snippet>,
    config_repo: &dyn Repository<ToolConfig>,
) -> CoreResult<bool> {
    let mut seeded = false;

    if snippet_repo.list().await?.is_empty() {
        for snippet in snippets() {
            snippet_repo.create(snippet).await?;
        }
        seeded = true;
    }

    if config_repo.list().await?.is_empty() {
        for config in configs() {
            config_repo.create(config).await?;
        }
        seeded = true;
    }

    if seeded {
        info!("Seeded empty store with sample records");
    }
    Ok(seeded)
}
