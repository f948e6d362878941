fn main() {
    std::process::exit(uikit_harvest_lib::run());
}
