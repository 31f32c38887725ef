/// Offline commands behind the `master` and `analyze` subcommands
use crate::{
    config::ServerConfig,
    error::{Result, ServerError},
};
use onair_codec::{EncoderRegistry, SymphoniaDecoder};
use onair_core::{AudioBuffer, OutputFormat};
use onair_dsp::{analyze, master, LoudnessReport, MasteringResult};
use std::path::Path;

/// Output format for a file: explicit choice, else the output extension, else WAV
pub fn resolve_format(explicit: Option<OutputFormat>, output: &Path) -> Result<OutputFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext
            .parse()
            .map_err(|e: onair_core::OnairError| ServerError::BadRequest(e.to_string())),
        None => Ok(OutputFormat::Wav),
    }
}

fn decode_file(input: &Path) -> Result<AudioBuffer> {
    let bytes = std::fs::read(input)?;
    let extension = input.extension().and_then(|e| e.to_str());
    Ok(SymphoniaDecoder::new().decode_bytes(&bytes, extension)?)
}

/// Master `input` into `output`
pub fn master_file(
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
    target_lufs: Option<f64>,
    config: &ServerConfig,
) -> Result<MasteringResult> {
    let format = resolve_format(format, output)?;
    let mut mastering = config.mastering;
    if let Some(target) = target_lufs {
        mastering.target_lufs = target;
    }

    let encoders = EncoderRegistry::new(config.encoder.ffmpeg_path.clone());
    encoders.encoder_for(format)?;

    let buffer = decode_file(input)?;
    let result = master(&buffer, &mastering)?;
    let encoded = encoders.encode(&result.buffer, format)?;
    std::fs::write(output, encoded)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        gain_db = result.applied_gain_db,
        "Mastered file"
    );
    Ok(result)
}

/// Measure a file without processing it
pub fn analyze_file(input: &Path) -> Result<LoudnessReport> {
    Ok(analyze(&decode_file(input)?))
}

/// One-line-per-field summary printed by the `master` subcommand
pub fn summarize(result: &MasteringResult) -> String {
    let lufs = |v: Option<f64>| match v {
        Some(v) => format!("{:.2} LUFS", v),
        None => "silent".to_string(),
    };

    let mut lines = vec![
        format!("Loudness before: {}", lufs(result.loudness_before)),
        format!("Applied gain:    {:+.2} dB", result.applied_gain_db),
        format!("Loudness after:  {}", lufs(result.loudness_after)),
        format!(
            "Peak:            {:.4} -> {:.4}",
            result.peak_before, result.peak_after
        ),
    ];
    lines.extend(result.notices.iter().map(|n| format!("Note: {}", n)));
    lines.join("\n")
}
