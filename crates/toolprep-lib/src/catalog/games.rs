use super::{
    AMD64_ONLY, ARCHIVE_MARKER, BOTH, Category, IconSource, InstallTarget, PayloadKind, PostInstallStep, TargetBuilder,
    ToolDefinition, Variant,
};
use crate::resolver::{LineScanResolver, ReleaseAssetsResolver, UnityResolver};
use crate::utils::Architecture;

const STENCYL_PACKAGES: &[&str] = &[
    "libxtst6:i386",
    "libxext6:i386",
    "libxi6:i386",
    "libncurses5:i386",
    "libxt6:i386",
    "libxpm4:i386",
    "libxmu6:i386",
    "libgtk2.0-0:i386",
    "libatk1.0-0:i386",
    "libc6:i386",
    "libcairo2:i386",
    "libexpat1:i386",
    "libfontconfig1:i386",
    "libfreetype6:i386",
    "libglib2.0-0:i386",
    "libice6:i386",
    "libpango1.0-0:i386",
    "libpng12-0:i386",
    "libsm6:i386",
    "libxau6:i386",
    "libxcursor1:i386",
    "libxdmcp6:i386",
    "libxfixes3:i386",
    "libx11-6:i386",
    "libxinerama1:i386",
    "libxrandr2:i386",
    "libxrender1:i386",
    "zlib1g:i386",
    "libnss3-1d:i386",
    "libnspr4-0d:i386",
    "libcurl3:i386",
    "libasound2:i386",
];

const UNITY_PACKAGES: &[&str] = &[
    "gconf-service",
    "lib32gcc1",
    "lib32stdc++6",
    "libasound2",
    "libcairo2",
    "libcap2",
    "libcups2",
    "libfontconfig1",
    "libfreetype6",
    "libgconf-2-4",
    "libgdk-pixbuf2.0-0",
    "libglu1-mesa",
    "libgtk2.0-0",
    "libgl1-mesa-glx | libgl1-mesa-glx-lts-utopic | libgl1-mesa-glx-lts-vivid | libgl1-mesa-glx-lts-wily",
    "libnspr4",
    "libnss3",
    "libpango1.0-0",
    "libpq5",
    "libxcomposite1",
    "libxcursor1",
    "libxdamage1",
    "libxext6",
    "libxfixes3",
    "libxi6",
    "libxrandr2",
    "libxrender1",
    "libxtst6",
    "monodevelop",
];

fn stencyl() -> InstallTarget {
    TargetBuilder::new(
        (Category::Games, "stencyl", "Stencyl", "Stencyl game developer IDE"),
        BOTH,
        "http://www.stencyl.com/download/",
        "stencyl.desktop",
        &["Stencyl"],
        None,
        Box::new(LineScanResolver::stencyl()),
        IconSource::Bundled("data/other/icon-30x30.png"),
    )
    .packages(STENCYL_PACKAGES)
    .takes_file()
    .launcher_extra("Path", "{install_dir}")
    .launcher_extra("StartupWMClass", "stencyl-sw-Launcher")
    .build()
}

fn unity3d() -> InstallTarget {
    TargetBuilder::new(
        (Category::Games, "unity3d", "Unity3d", "Unity 3D Editor Linux experimental support"),
        AMD64_ONLY,
        "https://forum.unity3d.com/threads/unity-on-linux-release-notes-and-known-issues.350256",
        "unity3d-editor.desktop",
        &["Editor/Unity"],
        Some("unity-editor*"),
        Box::new(UnityResolver),
        IconSource::Bundled("unity-editor-icon.png"),
    )
    .packages(UNITY_PACKAGES)
    .payload(PayloadKind::EmbeddedArchive { marker: ARCHIVE_MARKER })
    .needs_root()
    .launcher_name("Unity3D Editor")
    .post_install(PostInstallStep::SetuidRoot {
        path: "Editor/chrome-sandbox",
    })
    .build()
}

fn twine() -> InstallTarget {
    TargetBuilder::new(
        (
            Category::Games,
            "twine",
            "Twine",
            "Twine tool for creating interactive and nonlinear stories",
        ),
        BOTH,
        "http://twinery.org/",
        "twine.desktop",
        &["Twine"],
        Some("twine*"),
        Box::new(LineScanResolver::twine()),
        // The archive ships no icon.
        IconSource::Downloaded {
            url: "http://twinery.org/img/logo.svg".to_string(),
            file_name: "logo.svg".to_string(),
        },
    )
    .takes_file()
    .build()
}

fn superpowers() -> InstallTarget {
    TargetBuilder::new(
        (Category::Games, "superpowers", "Superpowers", "The HTML5 2D+3D game maker"),
        BOTH,
        ReleaseAssetsResolver::latest_release_page("superpowers/superpowers-app"),
        "superpowers.desktop",
        &["Superpowers"],
        Some("superpowers*"),
        Box::new(ReleaseAssetsResolver::superpowers()),
        IconSource::Bundled("resources/app/renderer/images/superpowers-256.png"),
    )
    .takes_file()
    .build()
}

fn definition(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    architectures: &'static [Architecture],
    build: fn(Variant) -> InstallTarget,
) -> ToolDefinition {
    ToolDefinition {
        category: Category::Games,
        id,
        name,
        description,
        architectures,
        variants: &[],
        build,
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        definition("stencyl", "Stencyl", "Stencyl game developer IDE", BOTH, |_| stencyl()),
        definition(
            "unity3d",
            "Unity3d",
            "Unity 3D Editor Linux experimental support",
            AMD64_ONLY,
            |_| unity3d(),
        ),
        definition(
            "twine",
            "Twine",
            "Twine tool for creating interactive and nonlinear stories",
            BOTH,
            |_| twine(),
        ),
        definition("superpowers", "Superpowers", "The HTML5 2D+3D game maker", BOTH, |_| superpowers()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;

    #[test]
    fn test_unity_is_a_root_script_install() {
        let target = lookup("games", "unity3d", Variant::Stable).unwrap();
        assert!(target.needs_root);
        assert_eq!(
            target.payload,
            PayloadKind::EmbeddedArchive {
                marker: "__ARCHIVE_BEGINS_HERE__"
            }
        );
        assert_eq!(
            target.post_install,
            [PostInstallStep::SetuidRoot {
                path: "Editor/chrome-sandbox"
            }]
        );
    }

    #[test]
    fn test_stencyl_launcher_carries_working_directory() {
        let target = lookup("games", "stencyl", Variant::Stable).unwrap();
        assert!(target.launcher.takes_file);
        assert!(target.launcher.extra.contains(&("Path", "{install_dir}")));
        assert!(target.strip_pattern.is_none());
    }
}
