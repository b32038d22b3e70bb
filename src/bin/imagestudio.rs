//! CLI for Image Studio - create, edit and share AI images.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imagestudio::image::ImageBackend;
use imagestudio::studio::{Clipboard, MemoryClipboard, SystemClipboard};
use imagestudio::{
    AspectRatio, CreateFunction, EditFunction, GeminiBackend, GenerationResult, LocationOutcome,
    Mode, Screen, Slot, Studio, Viewport,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "imagestudio")]
#[command(about = "Create, edit and combine images with Google's generative image models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key for the generative service
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the API endpoint root
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an image from a text prompt
    Create(CreateArgs),

    /// Edit an existing image with a text prompt
    Edit(EditArgs),

    /// Combine two images around a theme
    Compose(ComposeArgs),

    /// Open a share link and save the shared image
    View(ViewArgs),

    /// Interactive session driving the studio step by step
    Session,

    /// Check that the service is reachable and the key is accepted
    Check,
}

#[derive(Args)]
struct CreateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Prompt styling
    #[arg(short, long, value_enum, default_value = "free")]
    function: CreateFunctionArg,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Copy a share link to the clipboard
    #[arg(long)]
    share: bool,
}

#[derive(Args)]
struct EditArgs {
    /// What to change
    prompt: String,

    /// Image to edit
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Kind of edit
    #[arg(short, long, value_enum, default_value = "add-remove")]
    function: EditFunctionArg,

    /// Copy a share link to the clipboard
    #[arg(long)]
    share: bool,
}

#[derive(Args)]
struct ComposeArgs {
    /// Theme for the combined picture
    theme: String,

    /// First image
    #[arg(short, long)]
    input: PathBuf,

    /// Second image
    #[arg(short, long)]
    second: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Copy a share link to the clipboard
    #[arg(long)]
    share: bool,
}

#[derive(Args)]
struct ViewArgs {
    /// Share link (`...#image=<data URL>`)
    url: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CreateFunctionArg {
    Free,
    Sticker,
    Text,
    Comic,
}

impl From<CreateFunctionArg> for CreateFunction {
    fn from(arg: CreateFunctionArg) -> Self {
        match arg {
            CreateFunctionArg::Free => CreateFunction::Free,
            CreateFunctionArg::Sticker => CreateFunction::Sticker,
            CreateFunctionArg::Text => CreateFunction::Text,
            CreateFunctionArg::Comic => CreateFunction::Comic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EditFunctionArg {
    AddRemove,
    Retouch,
    Style,
}

impl From<EditFunctionArg> for EditFunction {
    fn from(arg: EditFunctionArg) -> Self {
        match arg {
            EditFunctionArg::AddRemove => EditFunction::AddRemove,
            EditFunctionArg::Retouch => EditFunction::Retouch,
            EditFunctionArg::Style => EditFunction::Style,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let Cli {
        command,
        api_key,
        base_url,
        json,
    } = Cli::parse();
    let backend = || build_backend(api_key.as_deref(), base_url.as_deref());

    match command {
        Commands::View(args) => view_shared(args, json),
        Commands::Create(args) => {
            let mut studio = Studio::with_backend(backend()?);
            studio.set_prompt(args.prompt);
            studio.set_mode(Mode::Create);
            studio.select_create_function(args.function.into());
            studio.set_aspect_ratio(args.aspect_ratio.into());
            run_once(&mut studio, &args.output, args.share, json).await
        }
        Commands::Edit(args) => {
            let mut studio = Studio::with_backend(backend()?);
            studio.set_prompt(args.prompt);
            studio.set_mode(Mode::Edit);
            studio.select_edit_function(args.function.into());
            studio.upload_image(Slot::First, &args.input).await?;
            run_once(&mut studio, &args.output, args.share, json).await
        }
        Commands::Compose(args) => {
            let mut studio = Studio::with_backend(backend()?);
            studio.set_prompt(args.theme);
            studio.set_mode(Mode::Edit);
            studio.select_edit_function(EditFunction::Compose);
            studio.upload_image(Slot::First, &args.input).await?;
            studio.upload_image(Slot::Second, &args.second).await?;
            run_once(&mut studio, &args.output, args.share, json).await
        }
        Commands::Session => {
            let mut studio = Studio::with_backend(backend()?);
            run_session(&mut studio).await
        }
        Commands::Check => {
            let backend = backend()?;
            backend.health_check().await?;
            if json {
                let result = serde_json::json!({
                    "success": true,
                    "backend": backend.name(),
                    "create_model": backend.create_model(),
                    "edit_model": backend.edit_model(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}: OK", backend.name());
            }
            Ok(())
        }
    }
}

fn build_backend(api_key: Option<&str>, base_url: Option<&str>) -> anyhow::Result<GeminiBackend> {
    let mut builder = GeminiBackend::builder();
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(url) = base_url {
        builder = builder.base_url(url);
    }
    Ok(builder.build()?)
}

/// Copies to the system clipboard, falling back to memory when there is none.
fn copy_link<B: ImageBackend>(studio: &mut Studio<B>) -> anyhow::Result<String> {
    match SystemClipboard::new() {
        Ok(mut clipboard) => Ok(studio.share(&mut clipboard)?),
        Err(err) => {
            tracing::debug!("no system clipboard: {err}");
            let mut clipboard = MemoryClipboard::new();
            Ok(studio.share(&mut clipboard as &mut dyn Clipboard)?)
        }
    }
}

async fn run_once<B: ImageBackend>(
    studio: &mut Studio<B>,
    output: &Path,
    share: bool,
    json_output: bool,
) -> anyhow::Result<()> {
    studio.generate().await?;
    let Some(result) = studio.state().result.clone() else {
        anyhow::bail!("generation finished without a result");
    };
    result.save(output)?;

    let link = if share { Some(copy_link(studio)?) } else { None };
    print_result(&result, output, link.as_deref(), json_output)
}

fn print_result(
    result: &GenerationResult,
    output: &Path,
    link: Option<&str>,
    json_output: bool,
) -> anyhow::Result<()> {
    let size = result.decode_bytes()?.len();
    if json_output {
        let value = serde_json::json!({
            "type": "image",
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": size,
            "format": result.file_extension(),
            "model": result.metadata.model,
            "duration_ms": result.metadata.duration_ms,
            "text": result.metadata.text,
            "share_url": link,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Generated image: {} ({} bytes)", output.display(), size);
        if let Some(duration) = result.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
        if let Some(ref text) = result.metadata.text {
            println!("Model said: {}", text);
        }
        if let Some(link) = link {
            println!("Share link copied ({} chars)", link.len());
        }
    }
    Ok(())
}

fn view_shared(args: ViewArgs, json_output: bool) -> anyhow::Result<()> {
    // Read-only view needs no backend or credentials
    let mut studio = Studio::with_backend(NoBackend);
    match studio.open_location(&args.url) {
        LocationOutcome::ViewOnly => {}
        LocationOutcome::Normal => anyhow::bail!("link has no #image= fragment"),
        LocationOutcome::Cleared => anyhow::bail!("{}", imagestudio::studio::MSG_INVALID_SHARE_LINK),
    }
    let Some(result) = studio.displayed_image().cloned() else {
        anyhow::bail!("shared link carried no image");
    };
    result.save(&args.output)?;
    print_result(&result, &args.output, None, json_output)
}

/// Backend for the read-only view, which never generates.
struct NoBackend;

#[async_trait::async_trait]
impl ImageBackend for NoBackend {
    async fn text_to_image(
        &self,
        _request: &imagestudio::image::TextToImageRequest,
    ) -> imagestudio::Result<Vec<imagestudio::image::RawImage>> {
        Err(imagestudio::StudioError::validation("Shared images are read-only."))
    }

    async fn edit(
        &self,
        _request: &imagestudio::image::EditRequest,
    ) -> imagestudio::Result<Vec<imagestudio::image::ResponsePart>> {
        Err(imagestudio::StudioError::validation("Shared images are read-only."))
    }

    fn create_model(&self) -> &str {
        "none"
    }

    fn edit_model(&self) -> &str {
        "none"
    }

    fn name(&self) -> &str {
        "read-only"
    }

    async fn health_check(&self) -> imagestudio::Result<()> {
        Ok(())
    }
}

const SESSION_HELP: &str = "\
commands:
  prompt <text>             set the prompt
  mode create|edit          switch mode
  function <name>           free|sticker|text|comic or add-remove|retouch|style|compose
  ratio 1:1|16:9|9:16       aspect ratio (create mode)
  upload 1|2 <path>         load an image into a slot
  generate                  run the request
  edit-result               edit the current result
  new                       start a new image
  close                     close the result modal
  back                      back to the single-image layout
  download [dir]            save the result
  share                     copy a share link
  open <url>                open a location (share links enter read-only view)
  viewport <width>          set the viewport width in pixels
  status                    show the screen
  quit                      leave";

async fn run_session<B: ImageBackend>(studio: &mut Studio<B>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("{SESSION_HELP}");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        if matches!(command, "quit" | "exit") {
            break;
        }

        let outcome: anyhow::Result<()> = async {
            match command {
                "prompt" => studio.set_prompt(rest),
                "mode" => studio.set_mode(match rest {
                    "create" => Mode::Create,
                    "edit" => Mode::Edit,
                    other => anyhow::bail!("unknown mode: {other}"),
                }),
                "function" => match rest {
                    "free" => studio.select_create_function(CreateFunction::Free),
                    "sticker" => studio.select_create_function(CreateFunction::Sticker),
                    "text" => studio.select_create_function(CreateFunction::Text),
                    "comic" => studio.select_create_function(CreateFunction::Comic),
                    "add-remove" => studio.select_edit_function(EditFunction::AddRemove),
                    "retouch" => studio.select_edit_function(EditFunction::Retouch),
                    "style" => studio.select_edit_function(EditFunction::Style),
                    "compose" => studio.select_edit_function(EditFunction::Compose),
                    other => anyhow::bail!("unknown function: {other}"),
                },
                "ratio" => studio.set_aspect_ratio(rest.parse()?),
                "upload" => {
                    let (slot, path) = rest
                        .split_once(' ')
                        .ok_or_else(|| anyhow::anyhow!("usage: upload 1|2 <path>"))?;
                    let slot = match slot {
                        "1" => Slot::First,
                        "2" => Slot::Second,
                        other => anyhow::bail!("unknown slot: {other}"),
                    };
                    studio.upload_image(slot, path.trim()).await?;
                }
                "generate" => {
                    println!("Gerando sua imagem...");
                    studio.generate().await?;
                }
                "edit-result" => {
                    if !studio.edit_current_image()? {
                        anyhow::bail!("there is no result to edit");
                    }
                }
                "new" => studio.new_image(),
                "close" => studio.close_modal(),
                "back" => studio.hide_second_slot(),
                "download" => {
                    let dir = if rest.is_empty() { "." } else { rest };
                    let path = studio.download(dir)?;
                    println!("saved {}", path.display());
                }
                "share" => {
                    let link = copy_link(studio)?;
                    println!("{link}");
                }
                "open" => {
                    let outcome = studio.open_location(rest);
                    println!("{outcome:?}");
                }
                "viewport" => studio.set_viewport(Viewport::from_width(rest.parse()?)),
                "status" => {}
                "help" => println!("{SESSION_HELP}"),
                other => anyhow::bail!("unknown command: {other} (try `help`)"),
            }
            Ok(())
        }
        .await;

        if let Err(e) = outcome {
            eprintln!("error: {e}");
        }
        print!("{}", Screen::from_state(studio.state()));
        studio.clear_toast();
    }

    Ok(())
}
