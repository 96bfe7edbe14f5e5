use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::chunker::chunk;
use crate::config::{ConfigError, DumpConfig, ZeroStyle};
use crate::paint::paint;
use crate::surface::{Surface, SurfaceError, SurfaceProvider};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open {}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reading {} failed after {lines_read} lines", .path.display())]
    SourceRead {
        path: PathBuf,
        lines_read: usize,
        #[source]
        source: io::Error,
    },

    #[error("surface failed while dumping {}", .path.display())]
    Surface {
        path: PathBuf,
        #[source]
        source: SurfaceError,
    },
}

/// Dumps every file in `paths`, in order, one surface each.
///
/// The layout is validated before any file is touched. The first failing
/// file ends the run; its surface has already been discarded by then.
pub fn open_all<P: SurfaceProvider>(
    provider: &mut P,
    paths: &[PathBuf],
    bytes_per_line: usize,
    zero_style: ZeroStyle,
) -> Result<Vec<P::Surface>, SessionError> {
    let config = DumpConfig::new(bytes_per_line)?.with_zero_style(zero_style);

    let mut surfaces = Vec::with_capacity(paths.len());
    for path in paths {
        let surface = open_file(provider, path, &config).map_err(|e| {
            log::error!("{}", e);
            e
        })?;
        surfaces.push(surface);
    }
    Ok(surfaces)
}

/// Dumps the file at `path` into a freshly opened surface.
pub fn open_file<P: SurfaceProvider>(
    provider: &mut P,
    path: &Path,
    config: &DumpConfig,
) -> Result<P::Surface, SessionError> {
    let file = File::open(path).map_err(|source| SessionError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let name = format!("{}/hexa", path.display());
    run(provider, BufReader::new(file), path, &name, config)
}

/// One dump from source to shown surface.
///
/// The source is chunked completely before a surface is opened, so a read
/// fault never leaves a window behind. Once a surface exists, any failure
/// closes it with discard before the error is returned.
pub fn run<P: SurfaceProvider, R: Read>(
    provider: &mut P,
    source: R,
    path: &Path,
    name: &str,
    config: &DumpConfig,
) -> Result<P::Surface, SessionError> {
    let lines = chunk(source, config).map_err(|e| SessionError::SourceRead {
        path: path.to_path_buf(),
        lines_read: e.lines.len(),
        source: e.source,
    })?;
    log::info!("{}: {} lines", path.display(), lines.len());

    let surface_error = |source| SessionError::Surface {
        path: path.to_path_buf(),
        source,
    };

    let mut surface = provider.open().map_err(surface_error)?;
    let painted = surface
        .set_name(name)
        .and_then(|()| paint(&mut surface, &lines, config));

    match painted {
        Ok(_) => Ok(surface),
        Err(e) => {
            log::error!("{}: {}, discarding window", path.display(), e);
            if let Err(close) = surface.close(true) {
                log::warn!("{}: discard failed: {}", path.display(), close);
            }
            Err(surface_error(e))
        }
    }
}
