//! On-disk fixtures: function zips and stand-in `sam` executables.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// The handler used by the end-to-end tests.
pub const HANDLER_JS: &str = r#"exports.handler = async function (event, context) {
  return {
    isBase64Encoded: false,
    statusCode: 200,
    body: 'Hello World!',
    headers: {
      'content-type': 'application/json',
    },
  };
};
"#;

/// Write `<dir>/<name>` as a zip containing `handler.js`.
pub fn write_fixture_zip(dir: &Path, name: &str) -> Result<PathBuf> {
    write_zip(dir, name, &[("handler.js", HANDLER_JS)])
}

/// Write `<dir>/<name>` as a zip containing `files`.
pub fn write_zip(dir: &Path, name: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (file_name, contents) in files {
        zip.start_file(*file_name, options)?;
        zip.write_all(contents.as_bytes())?;
    }
    zip.finish()?;
    Ok(path)
}

/// Fake `sam` that records its arguments and working directory, prints the
/// readiness marker and then sleeps until killed.
///
/// Arguments are written one per line to `<dir>/args.txt`, the working
/// directory to `<dir>/cwd.txt`.
#[cfg(unix)]
pub fn write_fake_sam(dir: &Path) -> Result<PathBuf> {
    let args = dir.join("args.txt");
    let cwd = dir.join("cwd.txt");
    write_script(
        dir,
        "fake-sam",
        &format!(
            r#"#!/bin/sh
for arg in "$@"; do echo "$arg"; done > '{args}'
pwd > '{cwd}'
echo "Mounting functions"
echo "Running on http://127.0.0.1 (Press CTRL+C to quit)" >&2
exec sleep 60
"#,
            args = args.display(),
            cwd = cwd.display(),
        ),
    )
}

/// Fake `sam` that fails before it ever becomes ready.
#[cfg(unix)]
pub fn write_failing_sam(dir: &Path) -> Result<PathBuf> {
    write_script(
        dir,
        "failing-sam",
        "#!/bin/sh\necho \"Error: Running AWS SAM projects locally requires Docker.\" >&2\nexit 2\n",
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Arguments recorded by [`write_fake_sam`].
pub fn recorded_args(dir: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(dir.join("args.txt"))?
        .lines()
        .map(str::to_string)
        .collect())
}
