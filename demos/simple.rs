use miette::IntoDiagnostic;
use token_resolver::load;

fn main() {
    let files = [
        (
            "resolver.json",
            r#"{
                "name": "Demo",
                "sets": [{ "name": "base", "sources": ["base.json"] }],
                "modifiers": [{
                    "name": "theme",
                    "values": [
                        { "name": "light", "values": [] },
                        { "name": "dark", "values": ["dark.json"] }
                    ]
                }]
            }"#,
        ),
        ("base.json", r#"{ "color": { "text": "black", "bg": "white" } }"#),
        ("dark.json", r#"{ "color": { "text": "white", "bg": "black" } }"#),
    ];

    let resolver = match load(files) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("Failed to load design system: {:?}", miette::Report::new(e));
            return;
        }
    };

    let selection = [("theme".to_string(), "dark".to_string())].into_iter().collect();
    match resolver.apply(&selection) {
        Ok(output) => match output.to_json().into_diagnostic() {
            Ok(json_output) => println!("Resolved tokens for theme=dark:\n{json_output}"),
            Err(report) => eprintln!("Failed to serialize tokens: {report:?}"),
        },
        Err(e) => {
            eprintln!("Failed to apply selection: {:?}", miette::Report::new(e));
        }
    }
}
