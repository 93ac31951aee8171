//! The build driver.
//!
//! Phase order mirrors the data-flow contract: load stores, discover and
//! parse documents, ensure every linked target has an annotation (scraping
//! as needed; the only phase that writes the metadata store), rewrite every
//! document against the frozen store snapshot, then emit pages, fragments,
//! and the archive store. Documents rewrite in parallel; annotations created
//! mid-build for other documents appear on the next build via the auto log.

use std::{
    collections::HashSet,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use brotli::CompressorWriter;
use color_eyre::eyre::eyre;
use flate2::{Compression, write::GzEncoder};
use minify_html::{Cfg, minify};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    archive::Archive,
    ast::{Doc, html::doc_to_html, parse::parse_markdown},
    config::{BuildOptions, INPUT_DIR, OUTPUT_DIR},
    fragment::write_fragments,
    header::Header,
    metadata::{Item, Metadata},
    scrape::{Dispatcher, ScrapeError},
    transformer::{
        PageIndex, PageInfo, PassCtx, annotate, autolink::AutoLinker, image::InvertCache,
        rewrite_document,
    },
    types::CanonicalPath,
};

/// Build once into `public/` using the current working directory.
pub fn build_once(options: &BuildOptions) -> color_eyre::Result<()> {
    let root = std::env::current_dir()?;
    build_at(&root, options)
}

pub fn build_at(root: &Path, options: &BuildOptions) -> color_eyre::Result<()> {
    let ctx = BuildCtx::load_at(root, options);
    fs::create_dir_all(&ctx.output_dir)?;

    Pipeline::new(ctx)
        .load()?
        .discover()?
        .parse()?
        .scrape()?
        .transform()?
        .emit()
}

struct BuildCtx {
    root: PathBuf,
    input_dir: PathBuf,
    output_dir: PathBuf,
    options: BuildOptions,
    min_cfg: Cfg,
}

impl BuildCtx {
    fn load_at(root: &Path, options: &BuildOptions) -> Self {
        let mut min_cfg = Cfg::new();
        min_cfg.minify_css = false;
        min_cfg.minify_js = false;
        min_cfg.keep_closing_tags = true;
        min_cfg.keep_comments = false;

        Self {
            root: root.to_path_buf(),
            input_dir: root.join(INPUT_DIR),
            output_dir: root.join(OUTPUT_DIR),
            options: options.clone(),
            min_cfg,
        }
    }
}

/// A source document on its way through the phases.
struct SourceDoc {
    rel: PathBuf,
    header: Header,
    doc: Doc,
}

impl SourceDoc {
    /// Site path of the rendered page: `improvement.md` renders at
    /// `/improvement`.
    fn page_path(&self) -> String {
        let no_ext = self.rel.with_extension("");
        format!("/{}", no_ext.to_string_lossy().replace('\\', "/"))
    }
}

trait PipelineStage {}

/// Typestate driver: each phase consumes the previous one's evidence.
struct Pipeline<S: PipelineStage> {
    ctx: BuildCtx,
    state: S,
}

impl PipelineStage for () {}

struct Loaded {
    meta: Metadata,
    archive: Archive,
    autolinker: AutoLinker,
    invert: Arc<InvertCache>,
    dispatcher: Dispatcher,
}
impl PipelineStage for Loaded {}

struct Discovered {
    stores: Loaded,
    sources: Vec<(PathBuf, String)>,
}
impl PipelineStage for Discovered {}

struct Parsed {
    stores: Loaded,
    docs: Vec<SourceDoc>,
}
impl PipelineStage for Parsed {}

struct Scraped {
    stores: Loaded,
    docs: Vec<SourceDoc>,
    pages: PageIndex,
}
impl PipelineStage for Scraped {}

struct Transformed {
    stores: Loaded,
    docs: Vec<SourceDoc>,
}
impl PipelineStage for Transformed {}

impl Pipeline<()> {
    fn new(ctx: BuildCtx) -> Self {
        Self { ctx, state: () }
    }

    fn load(self) -> color_eyre::Result<Pipeline<Loaded>> {
        let mut meta = Metadata::load(&self.ctx.root)?;
        meta.recurse_inline(annotate::decorate_anchors_html);
        let archive = Archive::load(&self.ctx.root, &self.ctx.options)?;
        let autolinker = AutoLinker::load(&self.ctx.root)?;
        let invert = Arc::new(InvertCache::new(&self.ctx.root, &self.ctx.options)?);
        let dispatcher = Dispatcher::new(&self.ctx.root, &self.ctx.options, invert.clone())?;
        Ok(Pipeline {
            ctx: self.ctx,
            state: Loaded {
                meta,
                archive,
                autolinker,
                invert,
                dispatcher,
            },
        })
    }
}

impl Pipeline<Loaded> {
    fn discover(self) -> color_eyre::Result<Pipeline<Discovered>> {
        let md_paths: Vec<PathBuf> = WalkDir::new(&self.ctx.input_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "md")
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();

        let sources_res: Vec<_> = md_paths
            .par_iter()
            .map(|path| {
                fs::read_to_string(path)
                    .map(|content| (path.clone(), content))
                    .map_err(|e| eyre!("Failed to read {}: {e}", path.display()))
            })
            .collect();

        let mut sources: Vec<(PathBuf, String)> =
            sources_res.into_iter().collect::<Result<_, _>>()?;
        sources.par_sort_by(|a, b| a.0.cmp(&b.0));
        info!(documents = sources.len(), "discovered");

        Ok(Pipeline {
            ctx: self.ctx,
            state: Discovered {
                stores: self.state,
                sources,
            },
        })
    }
}

impl Pipeline<Discovered> {
    fn parse(self) -> color_eyre::Result<Pipeline<Parsed>> {
        let input_dir = &self.ctx.input_dir;
        let docs: Vec<SourceDoc> = self
            .state
            .sources
            .par_iter()
            .map(|(full_path, content)| {
                let rel = full_path
                    .strip_prefix(input_dir)
                    .map(|p| p.to_owned())
                    .map_err(|_| eyre!("Path outside input dir: {}", full_path.display()))?;
                let header = Header::try_from(content.as_str()).unwrap_or_default();
                Ok(SourceDoc {
                    rel,
                    header,
                    doc: parse_markdown(content),
                })
            })
            .collect::<color_eyre::Result<_>>()?;

        Ok(Pipeline {
            ctx: self.ctx,
            state: Parsed {
                stores: self.state.stores,
                docs,
            },
        })
    }
}

impl Pipeline<Parsed> {
    /// The only phase that writes the metadata store: every link target
    /// missing an annotation is scraped (fetches in parallel, appends
    /// serialized) and the outcome recorded. Also builds the page index the
    /// page-link walker consumes.
    fn scrape(self) -> color_eyre::Result<Pipeline<Scraped>> {
        let Parsed { mut stores, docs } = self.state;

        let mut all_targets: Vec<CanonicalPath> = Vec::new();
        for source in &docs {
            for target in annotate::collect_link_targets(&source.doc) {
                all_targets.push(CanonicalPath::new(&target));
            }
        }

        let pages = build_page_index(&docs, &all_targets);

        let mut seen: HashSet<String> = HashSet::new();
        let missing: Vec<CanonicalPath> = all_targets
            .into_iter()
            .filter(|p| seen.insert(p.key().to_string()))
            .filter(|p| !p.key().is_empty() && !stores.meta.contains(p.key()))
            .collect();
        info!(missing = missing.len(), "annotations to scrape");

        // Fetches run concurrently; the auto-log appends below are serial.
        let results: Vec<(CanonicalPath, Result<Item, ScrapeError>)> = missing
            .par_iter()
            .map(|path| (path.clone(), stores.dispatcher.scrape(path)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(item) => {
                    debug!(path = path.key(), title = %item.title, "scraped");
                    stores.meta.append_auto(path.key(), item)?;
                }
                Err(ScrapeError::Permanent(reason)) => {
                    debug!(path = path.key(), %reason, "negative-cached");
                    stores.meta.append_auto(path.key(), Item::negative())?;
                }
                Err(ScrapeError::Temporary(reason)) => {
                    debug!(path = path.key(), %reason, "will retry next build");
                }
                Err(ScrapeError::Fatal(message)) => return Err(eyre!(message)),
            }
        }

        Ok(Pipeline {
            ctx: self.ctx,
            state: Scraped {
                stores,
                docs,
                pages,
            },
        })
    }
}

impl Pipeline<Scraped> {
    /// Rewrite every document against the now-frozen metadata snapshot.
    fn transform(self) -> color_eyre::Result<Pipeline<Transformed>> {
        let Scraped {
            stores,
            mut docs,
            pages,
        } = self.state;

        let options = &self.ctx.options;
        docs.par_iter_mut()
            .map(|source| {
                let pass_ctx = PassCtx {
                    meta: &stores.meta,
                    archive: &stores.archive,
                    pages: &pages,
                    autolinker: &stores.autolinker,
                    invert: &stores.invert,
                    options,
                };
                rewrite_document(&mut source.doc, &pass_ctx)
                    .map_err(|e| eyre!("{}: {e}", source.rel.display()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Pipeline {
            ctx: self.ctx,
            state: Transformed { stores, docs },
        })
    }
}

impl Pipeline<Transformed> {
    fn emit(self) -> color_eyre::Result<()> {
        let Transformed { stores, docs } = self.state;

        let results: Vec<io::Result<()>> = docs
            .par_iter()
            .map(|source| {
                let rel_out = source.rel.with_extension("html");
                let out_path = self.ctx.output_dir.join(&rel_out);
                let title_fallback = source.page_path();
                let page = page_shell(
                    &source.header.head_html(&title_fallback),
                    &source.header.body_head_html(),
                    &doc_to_html(&source.doc),
                );
                let minified = minify(page.as_bytes(), &self.ctx.min_cfg);
                write_with_compression(&out_path, &minified)
            })
            .collect();
        for result in results {
            result?;
        }
        info!(pages = docs.len(), "pages emitted");

        write_fragments(&stores.meta, &stores.archive, &self.ctx.root)?;
        stores.archive.save()?;

        if self.ctx.options.check {
            warn!("check mode: archive misses were reported, not fetched");
        }
        Ok(())
    }
}

fn build_page_index(docs: &[SourceDoc], targets: &[CanonicalPath]) -> PageIndex {
    let mut pages = PageIndex::new();
    for source in docs {
        let path = source.page_path();
        pages.insert(
            path.clone(),
            PageInfo {
                title: source
                    .header
                    .title()
                    .map(ToOwned::to_owned)
                    .unwrap_or(path),
                tags: source
                    .header
                    .tags()
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
                inbound: 0,
            },
        );
    }
    for target in targets {
        if let Some(info) = pages.get_mut(target.key()) {
            info.inbound += 1;
        }
    }
    pages
}

/// Minimal page shell shared by every emitted page.
fn page_shell(head_fragment: &str, body_head: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">{head_fragment}
<link rel="stylesheet" href="/static/css/default.css">
</head>
<body>
<main>
{body_head}{body}</main>
</body>
</html>
"#
    )
}

/// Emit a file together with precompressed `.gz` and `.br` siblings, so the
/// web server can negotiate an encoding without compressing per request.
fn write_with_compression(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    fs::write(sibling_with_suffix(path, "gz"), gzip_bytes(data)?)?;
    fs::write(sibling_with_suffix(path, "br"), brotli_bytes(data)?)?;
    Ok(())
}

/// `page.html` gets siblings `page.html.gz` and `page.html.br`.
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{suffix}"))
}

fn gzip_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

fn brotli_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    // Quality 6: close to the q11 ratio at a fraction of its cost, which
    // matters when every page of the site is re-encoded per build.
    let mut writer = CompressorWriter::new(Vec::new(), 4096, 6, 22);
    writer.write_all(data)?;
    Ok(writer.into_inner())
}
