use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use simplepay::logging;
use simplepay::{
    Currency, GatewayConfig, Language, PaymentData, PaymentMethod, RecurringPaymentData,
    RecurringTerms, SimplePayClient, TokenPaymentData,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simplepay-cli")]
#[command(about = "SimplePay v2 gateway client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Sign(SignArgs),
    Verify(VerifyArgs),
    Decode(DecodeArgs),
    Ipn(IpnArgs),
    Start(StartArgs),
    Recurring(RecurringArgs),
    Token(TokenArgs),
    CancelCard(CancelCardArgs),
}

#[derive(Parser)]
struct SignArgs {
    #[arg(long)]
    key: String,
    #[arg(long, conflicts_with = "input")]
    body: Option<String>,
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Parser)]
struct VerifyArgs {
    #[arg(long)]
    key: String,
    #[arg(long)]
    signature: String,
    #[arg(long, conflicts_with = "input")]
    body: Option<String>,
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Parser)]
struct DecodeArgs {
    /// Base64 `r` parameter from the return URL.
    #[arg(long)]
    payload: String,
    /// `s` parameter from the return URL, percent-encoded or not.
    #[arg(long)]
    signature: String,
}

#[derive(Parser)]
struct IpnArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    signature: String,
    /// Merchant key; resolved from the notification's merchant id when omitted.
    #[arg(long)]
    key: Option<String>,
}

#[derive(Args)]
struct PaymentArgs {
    #[arg(long)]
    order_ref: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long)]
    total: String,
    #[arg(long, default_value = "HUF")]
    currency: Currency,
    #[arg(long)]
    language: Option<Language>,
}

#[derive(Parser)]
struct StartArgs {
    #[command(flatten)]
    payment: PaymentArgs,
    #[arg(long)]
    method: Option<PaymentMethod>,
    #[arg(long)]
    redirect_url: Option<String>,
}

#[derive(Parser)]
struct RecurringArgs {
    #[command(flatten)]
    payment: PaymentArgs,
    #[arg(long)]
    customer: String,
    #[arg(long)]
    times: Option<u32>,
    #[arg(long)]
    until: Option<String>,
    #[arg(long)]
    max_amount: Option<u64>,
}

#[derive(Parser)]
struct TokenArgs {
    #[command(flatten)]
    payment: PaymentArgs,
    #[arg(long)]
    customer: String,
    #[arg(long)]
    token: String,
}

#[derive(Parser)]
struct CancelCardArgs {
    #[arg(long)]
    card_id: String,
    #[arg(long, default_value = "HUF")]
    currency: Currency,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config = GatewayConfig::from_env();
    logging::init_logging("simplepay", config.verbose)?;
    let cli = Cli::parse();
    match cli.command {
        Command::Sign(args) => run_sign(args),
        Command::Verify(args) => run_verify(args),
        Command::Decode(args) => run_decode(config, args),
        Command::Ipn(args) => run_ipn(config, args),
        Command::Start(args) => run_start(config, args),
        Command::Recurring(args) => run_recurring(config, args),
        Command::Token(args) => run_token(config, args),
        Command::CancelCard(args) => run_cancel_card(config, args),
    }
}

fn run_sign(args: SignArgs) -> Result<(), String> {
    let body = read_body(args.body, args.input)?;
    println!("{}", simplepay::sign(&body, &args.key));
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), String> {
    let body = read_body(args.body, args.input)?;
    if !simplepay::verify(&body, &args.signature, &args.key) {
        return Err("signature does not match body".to_string());
    }
    emit_info_line("Signature valid");
    Ok(())
}

fn run_decode(config: GatewayConfig, args: DecodeArgs) -> Result<(), String> {
    let result = simplepay::decode_payment_response(&config, &args.payload, &args.signature)
        .map_err(|err| err.to_string())?;
    print_json(&result)
}

fn run_ipn(config: GatewayConfig, args: IpnArgs) -> Result<(), String> {
    let raw_body = std::fs::read_to_string(&args.input).map_err(|err| err.to_string())?;
    let ack = match args.key {
        Some(key) => simplepay::ipn::acknowledge(&raw_body, &args.signature, &key),
        None => client(config)?.handle_ipn(&raw_body, &args.signature),
    }
    .map_err(|err| err.to_string())?;
    print_json(&ack)
}

fn run_start(config: GatewayConfig, args: StartArgs) -> Result<(), String> {
    let mut data = payment_data(args.payment);
    data.method = args.method;
    let response = client(config)?
        .start_payment_with_redirect(&data, args.redirect_url.as_deref())
        .map_err(|err| err.to_string())?;
    print_json(&response)
}

fn run_recurring(config: GatewayConfig, args: RecurringArgs) -> Result<(), String> {
    let data = RecurringPaymentData {
        payment: payment_data(args.payment),
        customer: args.customer,
        recurring: RecurringTerms {
            times: args.times,
            until: args.until,
            max_amount: args.max_amount,
        },
    };
    let response = client(config)?
        .start_recurring_payment(&data)
        .map_err(|err| err.to_string())?;
    emit_info_line(&format!("Registered {} card token(s)", response.tokens.len()));
    print_json(&response)
}

fn run_token(config: GatewayConfig, args: TokenArgs) -> Result<(), String> {
    let data = TokenPaymentData {
        payment: payment_data(args.payment),
        customer: args.customer,
        token: args.token,
    };
    let response = client(config)?
        .start_token_payment(&data)
        .map_err(|err| err.to_string())?;
    print_json(&response)
}

fn run_cancel_card(config: GatewayConfig, args: CancelCardArgs) -> Result<(), String> {
    let response = client(config)?
        .cancel_card(&args.card_id, Some(args.currency))
        .map_err(|err| err.to_string())?;
    print_json(&response)
}

fn client(config: GatewayConfig) -> Result<SimplePayClient, String> {
    SimplePayClient::new(config).map_err(|err| err.to_string())
}

fn payment_data(args: PaymentArgs) -> PaymentData {
    let order_ref = args
        .order_ref
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    emit_info_line(&format!("Order reference: {order_ref}"));
    let mut data = PaymentData::new(order_ref, args.email, args.total).with_currency(args.currency);
    data.language = args.language;
    data
}

/// Files are read as-is: a trailing newline is part of the signed bytes.
fn read_body(body: Option<String>, input: Option<PathBuf>) -> Result<String, String> {
    match (body, input) {
        (Some(body), _) => Ok(body),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|err| format!("cannot read {}: {err}", path.display())),
        (None, None) => Err("either --body or --input is required".to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn emit_info_line(message: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{}", message);
    } else {
        println!("{message}");
    }
}
