fn main() {
    if let Err(err) = datatable_migrate::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
