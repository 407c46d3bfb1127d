//! Ledger schema.
//!
//! Creates the chart of accounts, the journal, the balance cache, balance
//! periods, bank reconciliation and the petty-cash subledger. Money columns
//! hold signed minor units (`*_minor`). Built with the schema builder so the
//! same migration runs on PostgreSQL and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Code,
    Name,
    AccountType,
    IsCategory,
    ParentId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    TransactionType,
    Reference,
    AmountMinor,
    Currency,
    Description,
    TransactionDate,
    BoardingHouseId,
    Status,
    CreatedBy,
    PostedAt,
    VoidedAt,
    VoidedBy,
    VoidReason,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum JournalEntries {
    Table,
    Id,
    TransactionId,
    AccountId,
    LineNumber,
    EntryType,
    AmountMinor,
    Description,
    BoardingHouseId,
    CreatedBy,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum CurrentAccountBalances {
    Table,
    AccountId,
    CurrentBalanceMinor,
    TotalDebitsMinor,
    TotalCreditsMinor,
    TransactionCount,
    LastTransactionDate,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BalancePeriods {
    Table,
    Id,
    PeriodName,
    PeriodStartDate,
    PeriodEndDate,
    IsClosed,
    ClosedAt,
    ClosedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountPeriodBalances {
    Table,
    Id,
    AccountId,
    PeriodId,
    BalanceBroughtDownMinor,
    TotalDebitsMinor,
    TotalCreditsMinor,
    BalanceCarriedDownMinor,
    TransactionCount,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BalanceVerifications {
    Table,
    Id,
    AccountId,
    PeriodId,
    PreviousBalanceMinor,
    NewBalanceMinor,
    AdjustmentAmountMinor,
    Reason,
    VerifiedBy,
    VerifiedAt,
}

#[derive(DeriveIden)]
enum BankStatements {
    Table,
    Id,
    AccountId,
    StatementDate,
    OpeningBalanceMinor,
    ClosingBalanceMinor,
    FileReference,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BankStatementItems {
    Table,
    Id,
    StatementId,
    Position,
    BankDate,
    Description,
    Reference,
    DebitAmountMinor,
    CreditAmountMinor,
    BalanceMinor,
}

#[derive(DeriveIden)]
enum Reconciliations {
    Table,
    Id,
    AccountId,
    ReconciliationDate,
    StatementId,
    BookBalanceMinor,
    BankBalanceMinor,
    DifferenceMinor,
    Status,
    CreatedBy,
    CreatedAt,
    ReconciledBy,
    ReconciledAt,
}

#[derive(DeriveIden)]
enum ReconciliationItems {
    Table,
    Id,
    ReconciliationId,
    Source,
    JournalEntryId,
    BankStatementItemId,
    Position,
    ItemDate,
    Description,
    Reference,
    AmountMinor,
    IsReconciled,
    MatchedWith,
    MatchConfidencePct,
    MatchReason,
    MatchedAt,
    Notes,
}

#[derive(DeriveIden)]
enum PettyCashAccounts {
    Table,
    Id,
    UserId,
    BoardingHouseId,
    CurrentBalanceMinor,
    BeginningBalanceMinor,
    TotalInflowsMinor,
    TotalOutflowsMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PettyCashTransactions {
    Table,
    Id,
    PettyCashAccountId,
    TransactionType,
    AmountMinor,
    Description,
    Reference,
    LedgerTransactionId,
    TransactionDate,
    BalanceAfterMinor,
    CreatedBy,
    CreatedAt,
}

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().default(0).to_owned()
}

fn enum_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string_len(32).not_null().to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn nullable_timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: CHART OF ACCOUNTS & JOURNAL
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk(Accounts::Id))
                    .col(ColumnDef::new(Accounts::Code).string_len(20).not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(enum_col(Accounts::AccountType))
                    .col(
                        ColumnDef::new(Accounts::IsCategory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::ParentId).uuid().null())
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .col(nullable_timestamp(Accounts::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-parent_id")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-code-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk(Transactions::Id))
                    .col(ColumnDef::new(Transactions::TransactionType).string_len(64).not_null())
                    .col(ColumnDef::new(Transactions::Reference).string().null())
                    .col(money(Transactions::AmountMinor))
                    .col(ColumnDef::new(Transactions::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Transactions::BoardingHouseId).uuid().null())
                    .col(enum_col(Transactions::Status))
                    .col(ColumnDef::new(Transactions::CreatedBy).uuid().not_null())
                    .col(nullable_timestamp(Transactions::PostedAt))
                    .col(nullable_timestamp(Transactions::VoidedAt))
                    .col(ColumnDef::new(Transactions::VoidedBy).uuid().null())
                    .col(ColumnDef::new(Transactions::VoidReason).text().null())
                    .col(timestamp(Transactions::CreatedAt))
                    .col(timestamp(Transactions::UpdatedAt))
                    .col(nullable_timestamp(Transactions::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-transaction_date")
                    .table(Transactions::Table)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(pk(JournalEntries::Id))
                    .col(ColumnDef::new(JournalEntries::TransactionId).uuid().not_null())
                    .col(ColumnDef::new(JournalEntries::AccountId).uuid().not_null())
                    .col(ColumnDef::new(JournalEntries::LineNumber).integer().not_null())
                    .col(enum_col(JournalEntries::EntryType))
                    .col(
                        ColumnDef::new(JournalEntries::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(JournalEntries::AmountMinor).gt(0)),
                    )
                    .col(ColumnDef::new(JournalEntries::Description).text().null())
                    .col(ColumnDef::new(JournalEntries::BoardingHouseId).uuid().null())
                    .col(ColumnDef::new(JournalEntries::CreatedBy).uuid().not_null())
                    .col(timestamp(JournalEntries::CreatedAt))
                    .col(nullable_timestamp(JournalEntries::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journal_entries-transaction_id")
                            .from(JournalEntries::Table, JournalEntries::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journal_entries-account_id")
                            .from(JournalEntries::Table, JournalEntries::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-journal_entries-account_id")
                    .table(JournalEntries::Table)
                    .col(JournalEntries::AccountId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: BALANCE CACHE & PERIODS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(CurrentAccountBalances::Table)
                    .if_not_exists()
                    .col(pk(CurrentAccountBalances::AccountId))
                    .col(money(CurrentAccountBalances::CurrentBalanceMinor))
                    .col(money(CurrentAccountBalances::TotalDebitsMinor))
                    .col(money(CurrentAccountBalances::TotalCreditsMinor))
                    .col(money(CurrentAccountBalances::TransactionCount))
                    .col(ColumnDef::new(CurrentAccountBalances::LastTransactionDate).date().null())
                    .col(timestamp(CurrentAccountBalances::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-current_account_balances-account_id")
                            .from(CurrentAccountBalances::Table, CurrentAccountBalances::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalancePeriods::Table)
                    .if_not_exists()
                    .col(pk(BalancePeriods::Id))
                    .col(ColumnDef::new(BalancePeriods::PeriodName).string().not_null())
                    .col(ColumnDef::new(BalancePeriods::PeriodStartDate).date().not_null())
                    .col(ColumnDef::new(BalancePeriods::PeriodEndDate).date().not_null())
                    .col(
                        ColumnDef::new(BalancePeriods::IsClosed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(nullable_timestamp(BalancePeriods::ClosedAt))
                    .col(ColumnDef::new(BalancePeriods::ClosedBy).uuid().null())
                    .col(timestamp(BalancePeriods::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_periods-start-unique")
                    .table(BalancePeriods::Table)
                    .col(BalancePeriods::PeriodStartDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountPeriodBalances::Table)
                    .if_not_exists()
                    .col(pk(AccountPeriodBalances::Id))
                    .col(ColumnDef::new(AccountPeriodBalances::AccountId).uuid().not_null())
                    .col(ColumnDef::new(AccountPeriodBalances::PeriodId).uuid().not_null())
                    .col(money(AccountPeriodBalances::BalanceBroughtDownMinor))
                    .col(money(AccountPeriodBalances::TotalDebitsMinor))
                    .col(money(AccountPeriodBalances::TotalCreditsMinor))
                    .col(money(AccountPeriodBalances::BalanceCarriedDownMinor))
                    .col(money(AccountPeriodBalances::TransactionCount))
                    .col(timestamp(AccountPeriodBalances::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_period_balances-account_id")
                            .from(AccountPeriodBalances::Table, AccountPeriodBalances::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_period_balances-period_id")
                            .from(AccountPeriodBalances::Table, AccountPeriodBalances::PeriodId)
                            .to(BalancePeriods::Table, BalancePeriods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-account_period_balances-account-period-unique")
                    .table(AccountPeriodBalances::Table)
                    .col(AccountPeriodBalances::AccountId)
                    .col(AccountPeriodBalances::PeriodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalanceVerifications::Table)
                    .if_not_exists()
                    .col(pk(BalanceVerifications::Id))
                    .col(ColumnDef::new(BalanceVerifications::AccountId).uuid().not_null())
                    .col(ColumnDef::new(BalanceVerifications::PeriodId).uuid().not_null())
                    .col(money(BalanceVerifications::PreviousBalanceMinor))
                    .col(money(BalanceVerifications::NewBalanceMinor))
                    .col(money(BalanceVerifications::AdjustmentAmountMinor))
                    .col(ColumnDef::new(BalanceVerifications::Reason).text().null())
                    .col(ColumnDef::new(BalanceVerifications::VerifiedBy).uuid().not_null())
                    .col(timestamp(BalanceVerifications::VerifiedAt))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: BANK RECONCILIATION
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(BankStatements::Table)
                    .if_not_exists()
                    .col(pk(BankStatements::Id))
                    .col(ColumnDef::new(BankStatements::AccountId).uuid().not_null())
                    .col(ColumnDef::new(BankStatements::StatementDate).date().not_null())
                    .col(money(BankStatements::OpeningBalanceMinor))
                    .col(money(BankStatements::ClosingBalanceMinor))
                    .col(ColumnDef::new(BankStatements::FileReference).string().null())
                    .col(ColumnDef::new(BankStatements::CreatedBy).uuid().not_null())
                    .col(timestamp(BankStatements::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_statements-account_id")
                            .from(BankStatements::Table, BankStatements::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BankStatementItems::Table)
                    .if_not_exists()
                    .col(pk(BankStatementItems::Id))
                    .col(ColumnDef::new(BankStatementItems::StatementId).uuid().not_null())
                    .col(ColumnDef::new(BankStatementItems::Position).integer().not_null())
                    .col(ColumnDef::new(BankStatementItems::BankDate).date().not_null())
                    .col(ColumnDef::new(BankStatementItems::Description).text().not_null())
                    .col(ColumnDef::new(BankStatementItems::Reference).string().null())
                    .col(money(BankStatementItems::DebitAmountMinor))
                    .col(money(BankStatementItems::CreditAmountMinor))
                    .col(ColumnDef::new(BankStatementItems::BalanceMinor).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_statement_items-statement_id")
                            .from(BankStatementItems::Table, BankStatementItems::StatementId)
                            .to(BankStatements::Table, BankStatements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reconciliations::Table)
                    .if_not_exists()
                    .col(pk(Reconciliations::Id))
                    .col(ColumnDef::new(Reconciliations::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Reconciliations::ReconciliationDate).date().not_null())
                    .col(ColumnDef::new(Reconciliations::StatementId).uuid().null())
                    .col(money(Reconciliations::BookBalanceMinor))
                    .col(money(Reconciliations::BankBalanceMinor))
                    .col(money(Reconciliations::DifferenceMinor))
                    .col(enum_col(Reconciliations::Status))
                    .col(ColumnDef::new(Reconciliations::CreatedBy).uuid().not_null())
                    .col(timestamp(Reconciliations::CreatedAt))
                    .col(ColumnDef::new(Reconciliations::ReconciledBy).uuid().null())
                    .col(nullable_timestamp(Reconciliations::ReconciledAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reconciliations-account_id")
                            .from(Reconciliations::Table, Reconciliations::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reconciliations-account-date-unique")
                    .table(Reconciliations::Table)
                    .col(Reconciliations::AccountId)
                    .col(Reconciliations::ReconciliationDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReconciliationItems::Table)
                    .if_not_exists()
                    .col(pk(ReconciliationItems::Id))
                    .col(ColumnDef::new(ReconciliationItems::ReconciliationId).uuid().not_null())
                    .col(enum_col(ReconciliationItems::Source))
                    .col(ColumnDef::new(ReconciliationItems::JournalEntryId).uuid().null())
                    .col(ColumnDef::new(ReconciliationItems::BankStatementItemId).uuid().null())
                    .col(
                        ColumnDef::new(ReconciliationItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ReconciliationItems::ItemDate).date().not_null())
                    .col(ColumnDef::new(ReconciliationItems::Description).text().not_null())
                    .col(ColumnDef::new(ReconciliationItems::Reference).string().null())
                    .col(money(ReconciliationItems::AmountMinor))
                    .col(
                        ColumnDef::new(ReconciliationItems::IsReconciled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ReconciliationItems::MatchedWith).uuid().null())
                    .col(ColumnDef::new(ReconciliationItems::MatchConfidencePct).integer().null())
                    .col(ColumnDef::new(ReconciliationItems::MatchReason).text().null())
                    .col(nullable_timestamp(ReconciliationItems::MatchedAt))
                    .col(ColumnDef::new(ReconciliationItems::Notes).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reconciliation_items-reconciliation_id")
                            .from(ReconciliationItems::Table, ReconciliationItems::ReconciliationId)
                            .to(Reconciliations::Table, Reconciliations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reconciliation_items-journal_entry_id")
                    .table(ReconciliationItems::Table)
                    .col(ReconciliationItems::JournalEntryId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: PETTY CASH
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(PettyCashAccounts::Table)
                    .if_not_exists()
                    .col(pk(PettyCashAccounts::Id))
                    .col(ColumnDef::new(PettyCashAccounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(PettyCashAccounts::BoardingHouseId).uuid().not_null())
                    .col(money(PettyCashAccounts::CurrentBalanceMinor))
                    .col(money(PettyCashAccounts::BeginningBalanceMinor))
                    .col(money(PettyCashAccounts::TotalInflowsMinor))
                    .col(money(PettyCashAccounts::TotalOutflowsMinor))
                    .col(timestamp(PettyCashAccounts::CreatedAt))
                    .col(timestamp(PettyCashAccounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-petty_cash_accounts-user-house-unique")
                    .table(PettyCashAccounts::Table)
                    .col(PettyCashAccounts::UserId)
                    .col(PettyCashAccounts::BoardingHouseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PettyCashTransactions::Table)
                    .if_not_exists()
                    .col(pk(PettyCashTransactions::Id))
                    .col(ColumnDef::new(PettyCashTransactions::PettyCashAccountId).uuid().not_null())
                    .col(enum_col(PettyCashTransactions::TransactionType))
                    .col(money(PettyCashTransactions::AmountMinor))
                    .col(ColumnDef::new(PettyCashTransactions::Description).text().not_null())
                    .col(ColumnDef::new(PettyCashTransactions::Reference).string().null())
                    .col(ColumnDef::new(PettyCashTransactions::LedgerTransactionId).uuid().null())
                    .col(ColumnDef::new(PettyCashTransactions::TransactionDate).date().not_null())
                    .col(money(PettyCashTransactions::BalanceAfterMinor))
                    .col(ColumnDef::new(PettyCashTransactions::CreatedBy).uuid().not_null())
                    .col(timestamp(PettyCashTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-petty_cash_transactions-account_id")
                            .from(
                                PettyCashTransactions::Table,
                                PettyCashTransactions::PettyCashAccountId,
                            )
                            .to(PettyCashAccounts::Table, PettyCashAccounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-petty_cash_transactions-ledger_transaction_id")
                            .from(
                                PettyCashTransactions::Table,
                                PettyCashTransactions::LedgerTransactionId,
                            )
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order
        manager
            .drop_table(Table::drop().table(PettyCashTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PettyCashAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReconciliationItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reconciliations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankStatementItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankStatements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalanceVerifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountPeriodBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalancePeriods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CurrentAccountBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
