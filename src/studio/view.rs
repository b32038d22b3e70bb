//! Presentation models for the studio surfaces.
//!
//! Each surface is a plain value derived from [`StudioState`], so any front
//! end (terminal, web, native) renders the same thing.

use crate::error::ErrorKind;
use crate::image::{AspectRatio, CreateFunction, EditFunction, Mode};
use crate::studio::state::{StudioState, Toast};
use std::fmt;

/// Placeholder text when there is nothing to show yet.
pub const PLACEHOLDER_TEXT: &str = "Sua obra de arte aparecerá aqui";
/// Text shown while generating.
pub const LOADING_TEXT: &str = "Gerando sua imagem...";

/// A selectable function card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCard {
    /// Function identifier (`sticker`, `add-remove`, ...).
    pub key: &'static str,
    /// Card icon.
    pub icon: &'static str,
    /// Card label.
    pub label: &'static str,
    /// Currently selected.
    pub active: bool,
}

/// An image upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    /// Slot caption.
    pub caption: &'static str,
    /// Data URL preview of the loaded image.
    pub preview: Option<String>,
}

/// The left-hand controls surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsPanel {
    /// Prompt text.
    pub prompt: String,
    /// Active mode.
    pub mode: Mode,
    /// Function cards for the active mode.
    pub functions: Vec<FunctionCard>,
    /// Aspect ratio choices with the selected one; creation only.
    pub aspect_ratios: Option<(Vec<AspectRatio>, AspectRatio)>,
    /// Upload slots; edit only, two when composing.
    pub uploads: Vec<UploadSlot>,
    /// Inline validation message.
    pub validation: Option<String>,
    /// Generate control enabled.
    pub generate_enabled: bool,
}

/// Actions offered next to a displayed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    /// Reuse the result as the image to edit.
    Edit,
    /// Save the image.
    Download,
    /// Copy a share link.
    Share,
    /// Start over (mobile modal).
    NewImage,
}

/// What the result surface body shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultBody {
    /// Nothing generated yet.
    Placeholder,
    /// Request in flight.
    Loading,
    /// A finished image.
    Image {
        /// Image data URL.
        data_url: String,
        /// Available actions.
        actions: Vec<ResultAction>,
    },
}

/// The right-hand result surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    /// Error banner for non-validation failures.
    pub banner: Option<String>,
    /// Body content.
    pub body: ResultBody,
}

/// Full-screen result presentation on narrow viewports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileModal {
    /// Image data URL.
    pub data_url: String,
    /// Edit, download, new image.
    pub actions: Vec<ResultAction>,
}

/// Read-only page reached through a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOnlyPage {
    /// Shared image data URL.
    pub data_url: String,
}

/// Everything on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Shared image, no editing controls.
    ViewOnly(ViewOnlyPage),
    /// The editable studio.
    Studio {
        /// Left surface.
        controls: ControlsPanel,
        /// Right surface.
        result: ResultPanel,
        /// Mobile modal, when open.
        modal: Option<MobileModal>,
        /// Transient toast.
        toast: Option<Toast>,
    },
}

fn create_card(function: CreateFunction) -> (&'static str, &'static str) {
    match function {
        CreateFunction::Free => ("✨", "Prompt"),
        CreateFunction::Sticker => ("🏷️", "Adesivos"),
        CreateFunction::Text => ("📝", "Logo"),
        CreateFunction::Comic => ("💭", "HQ"),
    }
}

fn edit_card(function: EditFunction) -> (&'static str, &'static str) {
    match function {
        EditFunction::AddRemove => ("➕", "Adicionar"),
        EditFunction::Retouch => ("🎯", "Retoque"),
        EditFunction::Style => ("🎨", "Estilo"),
        EditFunction::Compose => ("🖼️", "Unir"),
    }
}

impl ControlsPanel {
    /// Derives the controls surface.
    pub fn from_state(state: &StudioState) -> Self {
        let functions = match state.mode {
            Mode::Create => CreateFunction::ALL
                .into_iter()
                .map(|f| {
                    let (icon, label) = create_card(f);
                    FunctionCard {
                        key: f.as_str(),
                        icon,
                        label,
                        active: f == state.create_function,
                    }
                })
                .collect(),
            Mode::Edit => EditFunction::ALL
                .into_iter()
                .map(|f| {
                    let (icon, label) = edit_card(f);
                    FunctionCard {
                        key: f.as_str(),
                        icon,
                        label,
                        active: f == state.edit_function,
                    }
                })
                .collect(),
        };

        let preview = |slot: &Option<crate::image::ImagePayload>| {
            slot.as_ref().map(|p| p.to_data_url())
        };
        let uploads = match (state.mode, state.show_two_images) {
            (Mode::Create, _) => Vec::new(),
            (Mode::Edit, false) => vec![UploadSlot {
                caption: "Imagem",
                preview: preview(&state.image1),
            }],
            (Mode::Edit, true) => vec![
                UploadSlot {
                    caption: "Primeira Imagem",
                    preview: preview(&state.image1),
                },
                UploadSlot {
                    caption: "Segunda Imagem",
                    preview: preview(&state.image2),
                },
            ],
        };

        Self {
            prompt: state.prompt.clone(),
            mode: state.mode,
            functions,
            aspect_ratios: (state.mode == Mode::Create)
                .then(|| (AspectRatio::ALL.to_vec(), state.aspect_ratio)),
            uploads,
            validation: state
                .error
                .as_ref()
                .filter(|n| n.kind == ErrorKind::Validation)
                .map(|n| n.message.clone()),
            generate_enabled: !state.loading,
        }
    }
}

impl ResultPanel {
    /// Derives the result surface.
    pub fn from_state(state: &StudioState) -> Self {
        let body = if state.loading {
            ResultBody::Loading
        } else if let Some(result) = &state.result {
            ResultBody::Image {
                data_url: result.as_data_url().to_string(),
                actions: vec![ResultAction::Edit, ResultAction::Download, ResultAction::Share],
            }
        } else {
            ResultBody::Placeholder
        };

        Self {
            banner: state
                .error
                .as_ref()
                .filter(|n| n.kind != ErrorKind::Validation)
                .map(|n| n.message.clone()),
            body,
        }
    }
}

impl Screen {
    /// Derives the whole screen.
    pub fn from_state(state: &StudioState) -> Self {
        if let Some(shared) = &state.view_only {
            return Self::ViewOnly(ViewOnlyPage {
                data_url: shared.as_data_url().to_string(),
            });
        }

        let modal = state
            .result
            .as_ref()
            .filter(|_| state.modal_open)
            .map(|result| MobileModal {
                data_url: result.as_data_url().to_string(),
                actions: vec![
                    ResultAction::Edit,
                    ResultAction::Download,
                    ResultAction::NewImage,
                ],
            });

        Self::Studio {
            controls: ControlsPanel::from_state(state),
            result: ResultPanel::from_state(state),
            modal,
            toast: state.toast.clone(),
        }
    }
}

/// Shortens a data URL for terminal display.
fn abbreviate(data_url: &str) -> String {
    match data_url.split_once(',') {
        Some((header, body)) => format!("{header},<{} base64 chars>", body.len()),
        None => data_url.to_string(),
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewOnly(page) => writeln!(f, "[shared image] {}", abbreviate(&page.data_url)),
            Self::Studio {
                controls,
                result,
                modal,
                toast,
            } => {
                writeln!(f, "mode: {}", controls.mode)?;
                writeln!(f, "prompt: {:?}", controls.prompt)?;
                let cards: Vec<String> = controls
                    .functions
                    .iter()
                    .map(|c| {
                        let mark = if c.active { "*" } else { " " };
                        format!("[{mark}{} {} ({})]", c.icon, c.label, c.key)
                    })
                    .collect();
                writeln!(f, "functions: {}", cards.join(" "))?;
                if let Some((ratios, selected)) = &controls.aspect_ratios {
                    let list: Vec<String> = ratios
                        .iter()
                        .map(|r| {
                            if r == selected {
                                format!("[{r}]")
                            } else {
                                r.to_string()
                            }
                        })
                        .collect();
                    writeln!(f, "aspect ratio: {}", list.join(" "))?;
                }
                for slot in &controls.uploads {
                    match &slot.preview {
                        Some(p) => writeln!(f, "{}: {}", slot.caption, abbreviate(p))?,
                        None => writeln!(f, "{}: (empty)", slot.caption)?,
                    }
                }
                if let Some(msg) = &controls.validation {
                    writeln!(f, "! {msg}")?;
                }
                if let Some(banner) = &result.banner {
                    writeln!(f, "error: {banner}")?;
                }
                match &result.body {
                    ResultBody::Placeholder => writeln!(f, "🎨 {PLACEHOLDER_TEXT}")?,
                    ResultBody::Loading => writeln!(f, "{LOADING_TEXT}")?,
                    ResultBody::Image { data_url, .. } => {
                        writeln!(f, "result: {}", abbreviate(data_url))?
                    }
                }
                if modal.is_some() {
                    writeln!(f, "(result modal open)")?;
                }
                if let Some(toast) = toast {
                    writeln!(f, "toast: {}", toast.message)?;
                }
                Ok(())
            }
        }
    }
}
