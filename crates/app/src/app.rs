use std::path::Path;

use anyhow::{Context, Result, bail};
use loading::{AssetLoader, IMAGE_TAGS, Image, MaterialLibrary, Model, split_full_id};

/// One resource named on the command line: a plain path, or
/// `archive.zip?path/inside` for an entry of a zip archive.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    File(String),
    Archive { archive: String, path: String },
}

impl Request {
    pub fn parse(arg: &str) -> Self {
        match split_full_id(arg) {
            Some((archive, path)) => Request::Archive {
                archive: archive.to_string(),
                path: path.to_string(),
            },
            None => Request::File(arg.to_string()),
        }
    }

    fn inner_path(&self) -> &str {
        match self {
            Request::File(path) => path,
            Request::Archive { path, .. } => path,
        }
    }

    fn type_tag(&self) -> String {
        Path::new(self.inner_path())
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    fn load<T: loading::Cacheable>(&self, assets: &AssetLoader) -> loading::Result<T> {
        match self {
            Request::File(path) => assets.load_from_file(path),
            Request::Archive { archive, path } => assets.load_from_archive(archive, path),
        }
    }

    /// Loads the resource and describes what was decoded.
    pub fn summarize(&self, assets: &AssetLoader) -> Result<String> {
        let tag = self.type_tag();
        let summary = match tag.as_str() {
            "obj" => {
                let model: Model = self.load(assets)?;
                let triangles: usize = model.meshes.iter().map(|m| m.indices.len() / 3).sum();
                format!(
                    "model {:?}: {} meshes, {triangles} triangles, {} materials, {} images",
                    model.name,
                    model.meshes.len(),
                    model.materials.len(),
                    model.images.len()
                )
            }
            "mtl" => {
                let library: MaterialLibrary = self.load(assets)?;
                format!(
                    "material library: {} materials, {} images",
                    library.materials.len(),
                    library.images.len()
                )
            }
            tag if IMAGE_TAGS.contains(&tag) => {
                let image: Image = self.load(assets)?;
                format!("image {}x{} {:?}", image.width, image.height, image.mode)
            }
            _ => bail!("don't know what to decode {tag:?} files into"),
        };
        Ok(summary)
    }
}

pub struct App {
    assets: AssetLoader,
}

impl Default for App {
    fn default() -> Self {
        Self {
            assets: AssetLoader::default(),
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        Ok(())
    }

    /// Decodes every request on the blocking pool. All of them share the same
    /// registries and cache; each task drives its own manager.
    pub async fn run(&self, args: Vec<String>) -> Result<()> {
        if args.is_empty() {
            bail!("usage: app <path | archive.zip?path/inside>...");
        }

        let tasks: Vec<_> = args
            .into_iter()
            .map(|arg| {
                let assets = self.assets.clone();
                let request = Request::parse(&arg);
                let task = tokio::task::spawn_blocking(move || request.summarize(&assets));
                (arg, task)
            })
            .collect();

        let total = tasks.len();
        let mut failed = 0;
        for (arg, task) in tasks {
            match task.await.with_context(|| format!("loading {arg} panicked"))? {
                Ok(summary) => log::info!("{arg}: {summary}"),
                Err(err) => {
                    failed += 1;
                    log::error!("{arg}: {err:#}");
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {total} resources failed to load");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_requests_split_on_the_last_separator() {
        assert_eq!(
            Request::parse("packs/ui.zip?icons/logo.PNG"),
            Request::Archive {
                archive: "packs/ui.zip".into(),
                path: "icons/logo.PNG".into()
            }
        );
        assert_eq!(Request::parse("ship.obj"), Request::File("ship.obj".into()));
        assert_eq!(Request::parse("packs/ui.zip?icons/logo.PNG").type_tag(), "png");
    }

    #[test]
    fn unknown_kinds_are_refused() {
        let assets = AssetLoader::default();
        let err = Request::parse("notes.txt").summarize(&assets).unwrap_err();
        assert!(err.to_string().contains("\"txt\""));
    }
}
