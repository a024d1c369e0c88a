use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "massget",
    author,
    version,
    about = "Download many files in parallel",
    long_about = None,
    args_override_self = true,
    override_usage = concat!(
        "massget [OPTIONS] (FILEPATH=URL)*\n",
        "       massget [OPTIONS] -s (FILEPATH URL)*"
    )
)]
pub struct Cli {
    /// Timeout in milliseconds until a transfer fails
    #[arg(short = 't', long = "timeout", value_name = "MS", allow_hyphen_values = true)]
    pub timeout: Option<String>,

    /// Maximum requests in parallel
    #[arg(short = 'p', long = "parallel", value_name = "N", allow_hyphen_values = true)]
    pub parallel: Option<String>,

    /// Split targets by argument instead of by the "=" character
    #[arg(short = 's', long = "script-safe")]
    pub script_safe: bool,

    /// FILEPATH=URL tokens, or FILEPATH URL pairs with --script-safe
    #[arg(value_name = "TARGETS", num_args = 1.., trailing_var_arg = true)]
    pub targets: Vec<String>,
}
