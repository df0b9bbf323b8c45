use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One file conversion discovered by the tree walk: the source capture
/// and its destination path under the mirrored tree, extension already
/// stripped (the caller appends the output format's extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// Recursively mirrors the directory structure of `src_root` under
/// `dest_root` and collects a conversion job for every regular file for
/// which `should_convert` holds.
///
/// Mirrored directories are created before any job inside them is
/// returned, so the jobs can be converted in any order afterwards.
/// Entries are visited in name order. Unreadable subdirectories are
/// logged and skipped; they do not abort the walk.
pub fn collect_jobs<F>(
    src_root: &Path,
    dest_root: &Path,
    should_convert: &F,
) -> io::Result<Vec<ConversionJob>>
where
    F: Fn(&Path) -> bool,
{
    let mut jobs = Vec::new();
    walk_dir(src_root, dest_root, should_convert, &mut jobs)?;
    Ok(jobs)
}

fn walk_dir<F>(
    src_dir: &Path,
    dest_dir: &Path,
    should_convert: &F,
    jobs: &mut Vec<ConversionJob>,
) -> io::Result<()>
where
    F: Fn(&Path) -> bool,
{
    fs::create_dir_all(dest_dir)?;

    let mut entries: Vec<PathBuf> = fs::read_dir(src_dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::error!("failed to read an entry of '{}': {}", src_dir.display(), e);
                None
            }
        })
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            let Some(name) = path.file_name() else {
                continue;
            };
            let child_dest = dest_dir.join(name);
            if let Err(e) = walk_dir(&path, &child_dest, should_convert, jobs) {
                log::error!("skipping subtree '{}': {}", path.display(), e);
            }
        } else if path.is_file() && should_convert(&path) {
            let Some(stem) = path.file_stem() else {
                continue;
            };
            jobs.push(ConversionJob {
                src: path.clone(),
                dest: dest_dir.join(stem),
            });
        }
    }

    Ok(())
}

/// The conversion rule of the KITTI capture layout: a file is converted
/// only when it sits directly inside a directory named after the sensor
/// channel being extracted.
pub fn channel_predicate(channel: String) -> impl Fn(&Path) -> bool {
    move |path: &Path| {
        path.parent()
            .and_then(Path::file_name)
            .map(|name| name == channel.as_str())
            .unwrap_or(false)
    }
}
