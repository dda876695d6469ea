fn main() {
    if let Err(err) = area_map_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
