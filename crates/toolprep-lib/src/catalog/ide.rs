use super::{
    AMD64_ONLY, BOTH, Category, IconSource, InstallTarget, PostInstallStep, TargetBuilder, ToolDefinition, Variant,
};
use crate::resolver::{
    ArduinoResolver, FixedLinksResolver, JetBrainsResolver, LineScanResolver, NetBeansResolver, ReleaseAssetsResolver,
    SiblingChecksumResolver,
};
use crate::utils::Architecture;

const JAVA: &[&str] = &["openjdk-7-jdk | openjdk-8-jdk"];

struct Eclipse {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    keyword: &'static str,
    desktop_filename: &'static str,
    icon: &'static str,
}

const ECLIPSE_JAVA: Eclipse = Eclipse {
    id: "eclipse",
    name: "Eclipse",
    description: "Eclipse Java IDE",
    keyword: "eclipse-java-",
    desktop_filename: "eclipse-java.desktop",
    icon: "java.png",
};
const ECLIPSE_JEE: Eclipse = Eclipse {
    id: "eclipse-jee",
    name: "Eclipse JEE",
    description: "Eclipse JEE IDE",
    keyword: "eclipse-jee-",
    desktop_filename: "eclipse-jee.desktop",
    icon: "javaee.png",
};
const ECLIPSE_PHP: Eclipse = Eclipse {
    id: "eclipse-php",
    name: "Eclipse PHP",
    description: "Eclipse PHP IDE",
    keyword: "eclipse-php-",
    desktop_filename: "eclipse-php.desktop",
    icon: "php.png",
};
const ECLIPSE_CPP: Eclipse = Eclipse {
    id: "eclipse-cpp",
    name: "Eclipse CPP",
    description: "Eclipse C/C++ IDE",
    keyword: "eclipse-cpp-",
    desktop_filename: "eclipse-cpp.desktop",
    icon: "cdt.png",
};

fn eclipse(edition: &Eclipse) -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, edition.id, edition.name, edition.description),
        BOTH,
        "https://www.eclipse.org/downloads/eclipse-packages/",
        edition.desktop_filename,
        &["eclipse"],
        Some("eclipse"),
        Box::new(SiblingChecksumResolver::eclipse(edition.keyword)),
        IconSource::Downloaded {
            url: format!("https://www.eclipse.org/downloads/images/{}", edition.icon),
            file_name: edition.icon.to_string(),
        },
    )
    .packages(JAVA)
    .takes_file()
    .build()
}

fn eclipse_definition(edition: &'static Eclipse, build: fn(Variant) -> InstallTarget) -> ToolDefinition {
    ToolDefinition {
        category: Category::Ide,
        id: edition.id,
        name: edition.name,
        description: edition.description,
        architectures: BOTH,
        variants: &[],
        build,
    }
}

struct JetBrains {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    code: &'static str,
    executable: &'static str,
    architectures: &'static [Architecture],
    packages: &'static [&'static str],
    strip_pattern: &'static str,
    desktop_filename: &'static str,
    icon: &'static str,
}

const PYCHARM: JetBrains = JetBrains {
    id: "pycharm",
    name: "PyCharm",
    description: "PyCharm Community Edition",
    code: "PCC",
    executable: "bin/pycharm.sh",
    architectures: BOTH,
    packages: &["python", "python3"],
    strip_pattern: "pycharm-community-*",
    desktop_filename: "jetbrains-pycharm-ce.desktop",
    icon: "bin/pycharm.png",
};
const PYCHARM_EDUCATIONAL: JetBrains = JetBrains {
    id: "pycharm-educational",
    name: "PyCharm Educational",
    description: "PyCharm Educational Edition",
    code: "PCE",
    executable: "bin/pycharm.sh",
    architectures: BOTH,
    packages: &["python", "python3"],
    strip_pattern: "pycharm-edu*",
    desktop_filename: "jetbrains-pycharm-edu.desktop",
    icon: "bin/pycharm.png",
};
const PYCHARM_PROFESSIONAL: JetBrains = JetBrains {
    id: "pycharm-professional",
    name: "PyCharm Professional",
    description: "PyCharm Professional Edition",
    code: "PCP",
    executable: "bin/pycharm.sh",
    architectures: BOTH,
    packages: &["python", "python3"],
    strip_pattern: "pycharm-*",
    desktop_filename: "jetbrains-pycharm.desktop",
    icon: "bin/pycharm.png",
};
const IDEA: JetBrains = JetBrains {
    id: "idea",
    name: "Idea",
    description: "IntelliJ IDEA Community Edition",
    code: "IIC",
    executable: "bin/idea.sh",
    architectures: BOTH,
    packages: JAVA,
    strip_pattern: "idea-IC-*",
    desktop_filename: "jetbrains-idea-ce.desktop",
    icon: "bin/idea.png",
};
const IDEA_ULTIMATE: JetBrains = JetBrains {
    id: "idea-ultimate",
    name: "Idea Ultimate",
    description: "IntelliJ IDEA",
    code: "IIU",
    executable: "bin/idea.sh",
    architectures: BOTH,
    packages: JAVA,
    strip_pattern: "idea-IU-*",
    desktop_filename: "jetbrains-idea.desktop",
    icon: "bin/idea.png",
};
const RUBYMINE: JetBrains = JetBrains {
    id: "rubymine",
    name: "RubyMine",
    description: "Ruby on Rails IDE",
    code: "RM",
    executable: "bin/rubymine.sh",
    architectures: BOTH,
    packages: &["ruby"],
    strip_pattern: "RubyMine-*",
    desktop_filename: "jetbrains-rubymine.desktop",
    icon: "bin/RMlogo.svg",
};
const WEBSTORM: JetBrains = JetBrains {
    id: "webstorm",
    name: "WebStorm",
    description: "Complex client-side and server-side javascript IDE",
    code: "WS",
    executable: "bin/webstorm.sh",
    architectures: BOTH,
    packages: &[],
    strip_pattern: "WebStorm-*",
    desktop_filename: "jetbrains-webstorm.desktop",
    icon: "bin/webstorm.svg",
};
const PHPSTORM: JetBrains = JetBrains {
    id: "phpstorm",
    name: "PhpStorm",
    description: "PHP and web development IDE",
    code: "PS",
    executable: "bin/phpstorm.sh",
    architectures: BOTH,
    packages: &[],
    strip_pattern: "PhpStorm-*",
    desktop_filename: "jetbrains-phpstorm.desktop",
    icon: "bin/phpstorm.png",
};
const CLION: JetBrains = JetBrains {
    id: "clion",
    name: "CLion",
    description: "CLion integrated C/C++ IDE",
    code: "CL",
    executable: "bin/clion.sh",
    architectures: AMD64_ONLY,
    packages: &[],
    strip_pattern: "clion-*",
    desktop_filename: "jetbrains-clion.desktop",
    icon: "bin/clion.svg",
};
const DATAGRIP: JetBrains = JetBrains {
    id: "datagrip",
    name: "DataGrip",
    description: "DataGrip SQL and databases IDE",
    code: "DG",
    executable: "bin/datagrip.sh",
    architectures: BOTH,
    packages: &[],
    strip_pattern: "DataGrip-*",
    desktop_filename: "jetbrains-datagrip.desktop",
    icon: "bin/product.png",
};
const GOGLAND: JetBrains = JetBrains {
    id: "gogland",
    name: "GogLand",
    description: "The Drive to Develop",
    code: "GO",
    executable: "bin/gogland.sh",
    architectures: BOTH,
    packages: &[],
    strip_pattern: "Gogland-*",
    desktop_filename: "jetbrains-gogland.desktop",
    icon: "bin/gogland.png",
};

fn jetbrains(product: &JetBrains, variant: Variant) -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, product.id, product.name, product.description),
        product.architectures,
        JetBrainsResolver::releases_page(product.code),
        product.desktop_filename,
        &[product.executable],
        Some(product.strip_pattern),
        Box::new(JetBrainsResolver),
        IconSource::Bundled(product.icon),
    )
    .packages(product.packages)
    .takes_file()
    .build()
    .into_variant(variant)
}

fn jetbrains_definition(product: &'static JetBrains, build: fn(Variant) -> InstallTarget) -> ToolDefinition {
    ToolDefinition {
        category: Category::Ide,
        id: product.id,
        name: product.name,
        description: product.description,
        architectures: product.architectures,
        variants: &[Variant::Eap],
        build,
    }
}

fn arduino() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "arduino", "Arduino", "The Arduino Software Distribution"),
        BOTH,
        "http://www.arduino.cc/en/Main/Software",
        "arduino.desktop",
        &["arduino"],
        Some("arduino-*"),
        Box::new(ArduinoResolver),
        IconSource::Bundled("lib/arduino_icon.ico"),
    )
    .packages(&["gcc-avr", "avr-libc"])
    .takes_file()
    .launcher_comment("The Arduino Software IDE")
    .post_install(PostInstallStep::JoinGroup {
        group: "dialout",
        notice: "You need to logout and login again for your installation to work",
    })
    .build()
}

fn netbeans() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "netbeans", "Netbeans", "Netbeans IDE"),
        BOTH,
        "https://netbeans.org/downloads/zip.html",
        "netbeans.desktop",
        &["bin/netbeans"],
        Some("netbeans*"),
        Box::new(NetBeansResolver),
        IconSource::Bundled("nb/netbeans.png"),
    )
    .packages(JAVA)
    .launcher_name("Netbeans IDE")
    .build()
}

fn visual_studio_code(variant: Variant) -> InstallTarget {
    let insiders = variant == Variant::Insiders;
    let mut target = TargetBuilder::new(
        (
            Category::Ide,
            "visual-studio-code",
            "Visual Studio Code",
            "Visual Studio focused on modern web and cloud",
        ),
        BOTH,
        "https://code.visualstudio.com/License",
        "visual-studio-code.desktop",
        &["bin/code"],
        Some("VSCode-linux-*"),
        Box::new(FixedLinksResolver::visual_studio_code(insiders)),
        IconSource::Bundled("resources/app/resources/linux/code.png"),
    )
    .packages(&["libgtk2.0-0"])
    .build()
    .into_variant(variant);
    if insiders {
        target.required_files = vec!["bin/code-insiders".to_string()];
    }
    target
}

fn lighttable() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "lighttable", "LightTable", "LightTable code editor"),
        AMD64_ONLY,
        ReleaseAssetsResolver::latest_release_page("LightTable/LightTable"),
        "lighttable.desktop",
        &["LightTable"],
        Some("lighttable-*"),
        Box::new(ReleaseAssetsResolver::lighttable()),
        IconSource::Bundled("resources/app/core/img/lticon.png"),
    )
    .build()
}

fn atom() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "atom", "Atom", "The hackable text editor"),
        AMD64_ONLY,
        ReleaseAssetsResolver::latest_release_page("Atom/Atom"),
        "atom.desktop",
        &["atom", "resources/app/apm/bin/apm"],
        Some("atom-*"),
        Box::new(ReleaseAssetsResolver::atom()),
        IconSource::Bundled("atom.png"),
    )
    .post_install(PostInstallStep::ExecLink {
        path: "resources/app/apm/bin/apm",
        link_name: "apm",
    })
    .build()
}

fn sublime_text() -> InstallTarget {
    TargetBuilder::new(
        (
            Category::Ide,
            "sublime-text",
            "Sublime Text",
            "Sophisticated text editor for code, markup and prose",
        ),
        BOTH,
        "https://sublimetext.com/3",
        "sublime-text.desktop",
        &["sublime_text"],
        Some("sublime_text_*"),
        Box::new(LineScanResolver::sublime_text()),
        IconSource::Bundled("Icon/128x128/sublime-text.png"),
    )
    .launcher_categories("Development;TextEditor;")
    .build()
}

fn spring_tools_suite() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "spring-tools-suite", "Spring Tools Suite", "Spring Tools Suite IDE"),
        BOTH,
        "https://spring.io/tools/sts/all",
        "STS.desktop",
        &["STS"],
        Some("sts-bundle/sts-*"),
        Box::new(SiblingChecksumResolver::spring_tools_suite()),
        IconSource::Bundled("icon.xpm"),
    )
    .packages(JAVA)
    .takes_file()
    .build()
}

fn processing() -> InstallTarget {
    TargetBuilder::new(
        (Category::Ide, "processing", "Processing", "Processing code editor"),
        BOTH,
        ReleaseAssetsResolver::latest_release_page("processing/processing"),
        "processing.desktop",
        &["processing"],
        Some("processing-*"),
        Box::new(ReleaseAssetsResolver::processing()),
        IconSource::Bundled("lib/icons/pde-256.png"),
    )
    .launcher_comment("Processing is a flexible software sketchbook")
    .build()
}

fn simple(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    architectures: &'static [Architecture],
    variants: &'static [Variant],
    build: fn(Variant) -> InstallTarget,
) -> ToolDefinition {
    ToolDefinition {
        category: Category::Ide,
        id,
        name,
        description,
        architectures,
        variants,
        build,
    }
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        eclipse_definition(&ECLIPSE_JAVA, |_| eclipse(&ECLIPSE_JAVA)),
        eclipse_definition(&ECLIPSE_JEE, |_| eclipse(&ECLIPSE_JEE)),
        eclipse_definition(&ECLIPSE_PHP, |_| eclipse(&ECLIPSE_PHP)),
        eclipse_definition(&ECLIPSE_CPP, |_| eclipse(&ECLIPSE_CPP)),
        jetbrains_definition(&PYCHARM, |v| jetbrains(&PYCHARM, v)),
        jetbrains_definition(&PYCHARM_EDUCATIONAL, |v| jetbrains(&PYCHARM_EDUCATIONAL, v)),
        jetbrains_definition(&PYCHARM_PROFESSIONAL, |v| jetbrains(&PYCHARM_PROFESSIONAL, v)),
        jetbrains_definition(&IDEA, |v| jetbrains(&IDEA, v)),
        jetbrains_definition(&IDEA_ULTIMATE, |v| jetbrains(&IDEA_ULTIMATE, v)),
        jetbrains_definition(&RUBYMINE, |v| jetbrains(&RUBYMINE, v)),
        jetbrains_definition(&WEBSTORM, |v| jetbrains(&WEBSTORM, v)),
        jetbrains_definition(&PHPSTORM, |v| jetbrains(&PHPSTORM, v)),
        jetbrains_definition(&CLION, |v| jetbrains(&CLION, v)),
        jetbrains_definition(&DATAGRIP, |v| jetbrains(&DATAGRIP, v)),
        jetbrains_definition(&GOGLAND, |v| jetbrains(&GOGLAND, v)),
        simple("arduino", "Arduino", "The Arduino Software Distribution", BOTH, &[], |_| arduino()),
        simple("netbeans", "Netbeans", "Netbeans IDE", BOTH, &[], |_| netbeans()),
        simple(
            "visual-studio-code",
            "Visual Studio Code",
            "Visual Studio focused on modern web and cloud",
            BOTH,
            &[Variant::Insiders],
            visual_studio_code,
        ),
        simple("lighttable", "LightTable", "LightTable code editor", AMD64_ONLY, &[], |_| lighttable()),
        simple("atom", "Atom", "The hackable text editor", AMD64_ONLY, &[], |_| atom()),
        simple(
            "sublime-text",
            "Sublime Text",
            "Sophisticated text editor for code, markup and prose",
            BOTH,
            &[],
            |_| sublime_text(),
        ),
        simple(
            "spring-tools-suite",
            "Spring Tools Suite",
            "Spring Tools Suite IDE",
            BOTH,
            &[],
            |_| spring_tools_suite(),
        ),
        simple("processing", "Processing", "Processing code editor", BOTH, &[], |_| processing()),
    ]
}
