use std::env;
use std::path::PathBuf;

// Video export links FFmpeg through ffmpeg-sys-next. On Windows that only
// works reliably with FFMPEG_DIR set, so point at a vcpkg install if one is
// present instead of failing deep inside the sys crate.
fn main() {
    for var in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!("cargo:warning=camroll: set FFMPEG_DIR (or VCPKG_ROOT) so FFmpeg can be found for video export");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.join("include").join("libavcodec").exists() {
        println!(
            "cargo:warning=camroll: found FFmpeg at {}; set FFMPEG_DIR to it",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=camroll: no FFmpeg headers under {}",
            candidate.display()
        );
    }
}
