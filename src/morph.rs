//! Batch invocation of the Future Weather Generator morphing tool.
//!
//! The tool is an opaque Java program. Each EPW file is passed to one
//! process run together with a fixed set of model and tuning arguments.

use crate::error::MorphError;
use crate::util::{display_name, list_files_with_suffix};
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Global climate models passed to the tool (Future Weather Generator 1.4.0).
pub const GCM_MODELS: &[&str] = &[
    "BCC_CSM2_MR",
    "CAS_ESM2_0",
    "CMCC_ESM2",
    "CNRM_CM6_1_HR",
    "CNRM_ESM2_1",
    "EC_Earth3",
    "EC_Earth3_Veg",
    "MIROC_ES2H",
    "MIROC6",
    "MRI_ESM2_0",
    "UKESM1_0_LL",
];

/// Main class of the morphing tool inside its jar.
pub const MORPH_MAIN_CLASS: &str = "futureweathergenerator.Morph";

/// Batches of at least this many files ask for confirmation first.
pub const CONFIRMATION_THRESHOLD: usize = 5;

/// Rough worst-case processing time of one file.
pub const ESTIMATED_TIME_PER_FILE: Duration = Duration::from_secs(340);

/// Arguments for the morphing tool.
#[derive(Debug, Clone)]
pub struct MorphConfig {
    /// Java launcher used to run the jar.
    pub java: PathBuf,
    /// Path to the Future Weather Generator jar.
    pub jar: PathBuf,
    /// Directory the tool writes its variants into.
    pub output_dir: PathBuf,
    pub models: Vec<String>,
    pub ensemble: u32,
    pub month_transition_hours: u32,
    pub multithread: bool,
    /// 0 = bilinear interpolation.
    pub interpolation_method_id: u8,
    pub limit_variables: bool,
    /// 2 = by day.
    pub solar_hour_adjustment: u8,
    /// 1 = Engerer (2015).
    pub diffuse_irradiation_model: u8,
}

impl MorphConfig {
    /// Default tool arguments, writing into `epw_dir/output`.
    pub fn new(jar: impl Into<PathBuf>, epw_dir: &Path) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: jar.into(),
            output_dir: epw_dir.join("output"),
            models: GCM_MODELS.iter().map(|m| m.to_string()).collect(),
            ensemble: 1,
            month_transition_hours: 72,
            multithread: true,
            interpolation_method_id: 0,
            limit_variables: true,
            solar_hour_adjustment: 2,
            diffuse_irradiation_model: 1,
        }
    }

    /// Full argument list passed to the launcher for `epw_file`.
    ///
    /// Paths are passed as given; callers hand in absolute paths. The
    /// output directory always carries a trailing separator, which the
    /// tool expects.
    pub fn command_args(&self, epw_file: &Path) -> Vec<OsString> {
        let mut output_dir = self.output_dir.clone().into_os_string();
        output_dir.push(std::path::MAIN_SEPARATOR_STR);

        vec![
            "-cp".into(),
            self.jar.clone().into_os_string(),
            MORPH_MAIN_CLASS.into(),
            epw_file.as_os_str().to_os_string(),
            self.models.join(",").into(),
            self.ensemble.to_string().into(),
            self.month_transition_hours.to_string().into(),
            output_dir,
            self.multithread.to_string().into(),
            self.interpolation_method_id.to_string().into(),
            self.limit_variables.to_string().into(),
            self.solar_hour_adjustment.to_string().into(),
            self.diffuse_irradiation_model.to_string().into(),
        ]
    }
}

/// Result of morphing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphOutcome {
    Success,
    /// The tool wrote to stderr, or could not be started.
    Failure(String),
}

/// Totals for one morphing batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Lists the `.epw` files directly inside `dir`, sorted.
pub fn list_epw_files(dir: &Path) -> Result<Vec<PathBuf>, MorphError> {
    let files = list_files_with_suffix(dir, &[".epw"])?;
    if files.is_empty() {
        warn!("No EPW files found in the selected path");
        return Err(MorphError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    info!(
        "Found {} EPW file(s) in the selected path ({})",
        files.len(),
        dir.display()
    );
    Ok(files)
}

/// Worst-case wall-clock estimate for `file_count` files.
pub fn estimated_wait(file_count: usize) -> Duration {
    ESTIMATED_TIME_PER_FILE * u32::try_from(file_count).unwrap_or(u32::MAX)
}

/// [`estimated_wait`] in whole minutes, rounded to the nearest minute.
pub fn estimated_minutes(file_count: usize) -> u64 {
    (estimated_wait(file_count).as_secs() + 30) / 60
}

/// Asks the operator whether a long batch should go ahead.
///
/// Anything but `n` / `no` (any case) counts as yes, including an empty
/// answer or end of input.
pub fn confirm_long_run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    file_count: usize,
) -> std::io::Result<bool> {
    warn!(
        "This operation might take a few minutes to complete for each file, so your wait \
         time for everything to be completed will be significant. Wait times can reach {}min \
         ({}), but might be considerably shorter depending on your hardware",
        estimated_minutes(file_count),
        humantime::format_duration(estimated_wait(file_count))
    );
    write!(output, "Continue? (Y/n)\n> ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer != "n" && answer != "no")
}

/// Runs the tool once for `epw_file`.
pub async fn morph_file(config: &MorphConfig, epw_file: &Path) -> MorphOutcome {
    let args = config.command_args(epw_file);
    debug!(
        "Executing FutureWeatherGenerator using the following command:\n{} {}",
        config.java.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let started = Instant::now();
    let output = match Command::new(&config.java).args(&args).output().await {
        Ok(output) => output,
        Err(e) => {
            return MorphOutcome::Failure(format!(
                "failed to start '{}': {}",
                config.java.display(),
                e
            ))
        }
    };
    let elapsed = Duration::from_secs(started.elapsed().as_secs());
    info!(
        "Operation completed in {} with return code {}",
        humantime::format_duration(elapsed),
        output
            .status
            .code()
            .map_or_else(|| "none".to_string(), |c| c.to_string())
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.is_empty() {
        MorphOutcome::Success
    } else {
        MorphOutcome::Failure(stderr.into_owned())
    }
}

/// Morphs every file in `files`, in order.
///
/// A file that fails is logged and counted; the batch continues.
pub async fn morph_all(config: &MorphConfig, files: &[PathBuf]) -> MorphSummary {
    let total = files.len();
    let mut summary = MorphSummary::default();

    for (index, epw_file) in files.iter().enumerate() {
        let name = display_name(epw_file);
        info!("({}/{}) Processing file {}", index + 1, total, name);

        let absolute = std::path::absolute(epw_file).unwrap_or_else(|_| epw_file.clone());
        summary.processed += 1;
        match morph_file(config, &absolute).await {
            MorphOutcome::Success => {
                summary.succeeded += 1;
                info!(
                    "({}/{}) Successfully processed file '{}'",
                    index + 1,
                    total,
                    name
                );
            }
            MorphOutcome::Failure(details) => {
                summary.failed += 1;
                error!(
                    "({}/{}) Something went wrong while processing '{}', see details:\n{}",
                    index + 1,
                    total,
                    name,
                    details
                );
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_command_args_order() {
        let config = MorphConfig::new("/opt/fwg/fwg.jar", Path::new("/data/epw"));
        let args: Vec<String> = config
            .command_args(Path::new("/data/epw/lisbon.epw"))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        let expected_output = format!("/data/epw/output{}", std::path::MAIN_SEPARATOR);
        assert_eq!(
            args,
            vec![
                "-cp",
                "/opt/fwg/fwg.jar",
                "futureweathergenerator.Morph",
                "/data/epw/lisbon.epw",
                "BCC_CSM2_MR,CAS_ESM2_0,CMCC_ESM2,CNRM_CM6_1_HR,CNRM_ESM2_1,EC_Earth3,EC_Earth3_Veg,MIROC_ES2H,MIROC6,MRI_ESM2_0,UKESM1_0_LL",
                "1",
                "72",
                expected_output.as_str(),
                "true",
                "0",
                "true",
                "2",
                "1",
            ]
        );
    }

    #[test]
    fn test_estimated_wait_scales_with_file_count() {
        assert_eq!(estimated_wait(5), Duration::from_secs(1700));
        assert_eq!(estimated_wait(0), Duration::ZERO);
    }

    #[test]
    fn test_estimated_minutes_round_to_nearest() {
        assert_eq!(estimated_minutes(1), 6);
        assert_eq!(estimated_minutes(3), 17);
        assert_eq!(estimated_minutes(5), 28);
        assert_eq!(estimated_minutes(0), 0);
    }

    #[test]
    fn test_confirmation_answers() {
        for (answer, expected) in [
            ("n\n", false),
            ("No\n", false),
            ("  NO  \n", false),
            ("\n", true),
            ("y\n", true),
            ("yes please\n", true),
            ("", true),
        ] {
            let mut input = Cursor::new(answer.as_bytes());
            let mut prompt = Vec::new();
            let proceed = confirm_long_run(&mut input, &mut prompt, 7).unwrap();
            assert_eq!(proceed, expected, "answer {answer:?}");
            assert!(String::from_utf8(prompt).unwrap().starts_with("Continue? (Y/n)"));
        }
    }

    #[test]
    fn test_list_epw_files_requires_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        assert!(matches!(
            list_epw_files(dir.path()),
            Err(MorphError::NoInputFiles { .. })
        ));

        std::fs::write(dir.path().join("b.EPW"), b"x").unwrap();
        std::fs::write(dir.path().join("a.epw"), b"x").unwrap();
        let files = list_epw_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.epw"));
    }

    #[tokio::test]
    async fn test_missing_launcher_is_a_per_file_failure() {
        let dir = tempfile::tempdir().unwrap();
        let epw = dir.path().join("a.epw");
        std::fs::write(&epw, b"x").unwrap();

        let mut config = MorphConfig::new("fwg.jar", dir.path());
        config.java = dir.path().join("no-such-java");

        let summary = morph_all(&config, &[epw.clone(), epw]).await;
        assert_eq!(
            summary,
            MorphSummary {
                processed: 2,
                succeeded: 0,
                failed: 2,
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_marks_failure_and_batch_continues() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        // Fake launcher: complains on stderr for any file named bad.epw.
        let launcher = dir.path().join("fake-java");
        std::fs::write(
            &launcher,
            "#!/bin/sh\ncase \"$4\" in *bad.epw) echo 'Exception in thread main' >&2 ;; esac\nexit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&launcher, std::fs::Permissions::from_mode(0o755)).unwrap();

        let files: Vec<PathBuf> = ["a.epw", "bad.epw", "c.epw"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"x").unwrap();
                path
            })
            .collect();

        let mut config = MorphConfig::new("fwg.jar", dir.path());
        config.java = launcher;

        let summary = morph_all(&config, &files).await;
        assert_eq!(
            summary,
            MorphSummary {
                processed: 3,
                succeeded: 2,
                failed: 1,
            }
        );
    }
}
