use animeseed_core::seed_catalog;

fn main() {
    let catalog = seed_catalog();
    let json = serde_json::to_string_pretty(&catalog).expect("serialize catalog");
    println!("{json}");
}
