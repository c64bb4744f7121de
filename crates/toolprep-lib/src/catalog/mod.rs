//! The static table of installable tools.

mod games;
mod ide;

use crate::error::ToolPrepError;
use crate::resolver::LinkResolver;
use crate::utils::Architecture;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Line that precedes the archive appended to a self-extracting installer script.
pub const ARCHIVE_MARKER: &str = "__ARCHIVE_BEGINS_HERE__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Ide,
    Games,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Ide, Category::Games];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Ide => "ide",
            Self::Games => "games",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ide => "Generic IDEs",
            Self::Games => "Games Development Environment",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.id() == id)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Release channel of a tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    #[default]
    Stable,
    Eap,
    Insiders,
}

impl Variant {
    /// Suffix appended to the install directory and desktop file stem.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Stable => "",
            Self::Eap => "-eap",
            Self::Insiders => "-insiders",
        }
    }

    fn flag(&self) -> &'static str {
        match self {
            Self::Stable => "",
            Self::Eap => "--eap",
            Self::Insiders => "--insiders",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    Archive,
    /// A shell script followed by an archive, starting after the line beginning with `marker`.
    EmbeddedArchive { marker: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconSource {
    /// Path relative to the install directory.
    Bundled(&'static str),
    /// Fetched with the artifact and copied into the install directory as `file_name`.
    Downloaded { url: String, file_name: String },
}

/// Desktop entry fields that do not depend on where the tool is installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherSpec {
    pub name: String,
    pub comment: String,
    pub categories: &'static str,
    /// Quote the executable and pass `%f` to it.
    pub takes_file: bool,
    /// Extra `key=value` lines; `{install_dir}` in a value is substituted.
    pub extra: Vec<(&'static str, &'static str)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostInstallStep {
    /// Make a file of the install directory setuid root.
    SetuidRoot { path: &'static str },
    /// Add the invoking user to a system group unless already a member.
    JoinGroup {
        group: &'static str,
        notice: &'static str,
    },
    /// Symlink a file of the install directory into the binary link directory.
    ExecLink { path: &'static str, link_name: &'static str },
}

/// Everything needed to install one tool.
#[derive(Debug)]
pub struct InstallTarget {
    pub id: String,
    pub category: Category,
    pub name: String,
    pub description: String,
    pub architectures: Vec<Architecture>,
    pub download_page: String,
    pub desktop_filename: String,
    /// Files that must exist after extraction; the first one is the executable.
    pub required_files: Vec<String>,
    /// Glob naming the directory of the archive whose contents become the install directory.
    pub strip_pattern: Option<String>,
    pub needs_root: bool,
    pub package_dependencies: Vec<String>,
    pub resolver: Box<dyn LinkResolver>,
    pub payload: PayloadKind,
    pub icon: IconSource,
    pub launcher: LauncherSpec,
    pub post_install: Vec<PostInstallStep>,
    pub variant: Variant,
}

impl InstallTarget {
    pub fn install_dir(&self, install_root: &Path) -> PathBuf {
        install_root
            .join(self.category.id())
            .join(format!("{}{}", self.id, self.variant.suffix()))
    }

    pub fn executable(&self, install_dir: &Path) -> Option<PathBuf> {
        self.required_files.first().map(|file| install_dir.join(file))
    }

    pub fn icon_path(&self, install_dir: &Path) -> PathBuf {
        match &self.icon {
            IconSource::Bundled(path) => install_dir.join(path),
            IconSource::Downloaded { file_name, .. } => install_dir.join(file_name),
        }
    }

    /// Derives the EAP/Insiders flavour of a stable target.
    fn into_variant(mut self, variant: Variant) -> Self {
        let (name, description) = match variant {
            Variant::Stable => return self,
            Variant::Eap => {
                self.download_page.push_str("&type=eap");
                (" EAP", " EAP")
            }
            Variant::Insiders => (" Insiders", " insiders"),
        };
        self.name.push_str(name);
        self.description.push_str(description);
        self.launcher.name.push_str(name);
        self.launcher.comment.push_str(description);
        self.desktop_filename = self
            .desktop_filename
            .replace(".desktop", &format!("{}.desktop", variant.suffix()));
        self.variant = variant;
        self
    }
}

/// Catalog row: what `list` shows and how to build the target.
pub struct ToolDefinition {
    pub category: Category,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub architectures: &'static [Architecture],
    pub variants: &'static [Variant],
    build: fn(Variant) -> InstallTarget,
}

impl ToolDefinition {
    pub fn build(&self, variant: Variant) -> Result<InstallTarget, ToolPrepError> {
        if variant != Variant::Stable && !self.variants.contains(&variant) {
            return Err(ToolPrepError::CliArgumentValidation {
                details: format!("{} does not offer {}", self.name, variant.flag()),
            });
        }
        Ok((self.build)(variant))
    }
}

const BOTH: &[Architecture] = &[Architecture::I386, Architecture::Amd64];
const AMD64_ONLY: &[Architecture] = &[Architecture::Amd64];

pub fn definitions() -> Vec<ToolDefinition> {
    ide::definitions().into_iter().chain(games::definitions()).collect()
}

pub fn lookup(category: &str, tool: &str, variant: Variant) -> Result<InstallTarget, ToolPrepError> {
    definitions()
        .into_iter()
        .find(|definition| definition.category.id() == category && definition.id == tool)
        .ok_or_else(|| ToolPrepError::UnknownTool {
            category: category.to_string(),
            tool: tool.to_string(),
        })?
        .build(variant)
}

/// Shared fields of a target; vendors fill in the rest.
struct TargetBuilder {
    target: InstallTarget,
}

impl TargetBuilder {
    #[allow(clippy::too_many_arguments)]
    fn new(
        definition: (Category, &str, &str, &str),
        architectures: &[Architecture],
        download_page: impl Into<String>,
        desktop_filename: &str,
        required_files: &[&str],
        strip_pattern: Option<&str>,
        resolver: Box<dyn LinkResolver>,
        icon: IconSource,
    ) -> Self {
        let (category, id, name, description) = definition;
        Self {
            target: InstallTarget {
                id: id.to_string(),
                category,
                name: name.to_string(),
                description: description.to_string(),
                architectures: architectures.to_vec(),
                download_page: download_page.into(),
                desktop_filename: desktop_filename.to_string(),
                required_files: required_files.iter().map(|f| f.to_string()).collect(),
                strip_pattern: strip_pattern.map(str::to_string),
                needs_root: false,
                package_dependencies: Vec::new(),
                resolver,
                payload: PayloadKind::Archive,
                icon,
                launcher: LauncherSpec {
                    name: name.to_string(),
                    comment: description.to_string(),
                    categories: "Development;IDE;",
                    takes_file: false,
                    extra: Vec::new(),
                },
                post_install: Vec::new(),
                variant: Variant::Stable,
            },
        }
    }

    fn packages(mut self, packages: &[&str]) -> Self {
        self.target.package_dependencies = packages.iter().map(|p| p.to_string()).collect();
        self
    }

    fn takes_file(mut self) -> Self {
        self.target.launcher.takes_file = true;
        self
    }

    fn launcher_name(mut self, name: &str) -> Self {
        self.target.launcher.name = name.to_string();
        self
    }

    fn launcher_comment(mut self, comment: &str) -> Self {
        self.target.launcher.comment = comment.to_string();
        self
    }

    fn launcher_categories(mut self, categories: &'static str) -> Self {
        self.target.launcher.categories = categories;
        self
    }

    fn launcher_extra(mut self, key: &'static str, value: &'static str) -> Self {
        self.target.launcher.extra.push((key, value));
        self
    }

    fn payload(mut self, payload: PayloadKind) -> Self {
        self.target.payload = payload;
        self
    }

    fn needs_root(mut self) -> Self {
        self.target.needs_root = true;
        self
    }

    fn post_install(mut self, step: PostInstallStep) -> Self {
        self.target.post_install.push(step);
        self
    }

    fn build(self) -> InstallTarget {
        self.target
    }
}
