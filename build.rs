use std::env;
use std::path::PathBuf;

// ffmpeg-sys-next does the actual discovery. This only points Windows users
// at the environment it needs when FFmpeg comes from vcpkg.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!(
            "cargo:warning=reframe needs FFmpeg development libraries; set FFMPEG_DIR to an FFmpeg install (for example a vcpkg triplet directory)."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(&triplet);

    if candidate.join("include").join("libavcodec").exists() {
        println!(
            "cargo:warning=Found FFmpeg headers under {}; set FFMPEG_DIR to this path if discovery fails.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=No FFmpeg install under {}. Run `vcpkg install ffmpeg:{triplet}` or set FFMPEG_DIR.",
            candidate.display(),
        );
    }
}
