fn main() {
    sqlcase::cli::run();
}
