//! Initial database migration.
//!
//! Creates the enums, tables, indexes, and triggers for invoices,
//! settlement transactions, debts, and ledger vouchers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(DEBTS_SQL).await?;
        db.execute_unprepared(SETTLEMENT_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_VOUCHERS_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Service ticket stage relayed from the workshop board
CREATE TYPE ticket_stage AS ENUM (
    'quoted',
    'in_progress',
    'handed_over',
    'completed'
);

-- Invoice lifecycle
CREATE TYPE invoice_status AS ENUM (
    'open',
    'settled',
    'converted_to_debt'
);

-- Tender method
CREATE TYPE payment_method AS ENUM ('cash', 'bank_transfer');

-- What a tender is for
CREATE TYPE tender_purpose AS ENUM ('deposit', 'payment');

-- Settlement transaction status
CREATE TYPE settlement_status AS ENUM (
    'pending',
    'success',
    'failed',
    'cancelled'
);

-- Which aggregate a transaction targets
CREATE TYPE settlement_target_kind AS ENUM ('invoice', 'debt');

-- Debt lifecycle
CREATE TYPE debt_status AS ENUM ('outstanding', 'settled');

-- Voucher kind and workflow status
CREATE TYPE voucher_kind AS ENUM ('income', 'expense');
CREATE TYPE voucher_status AS ENUM (
    'pending',
    'approved',
    'rejected',
    'finished'
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    service_ticket_id UUID NOT NULL,
    customer_id UUID NOT NULL,
    estimate_amount NUMERIC(15, 2) NOT NULL CHECK (estimate_amount >= 0),
    discount_percent NUMERIC(5, 2)
        CHECK (discount_percent IS NULL
               OR (discount_percent >= 0 AND discount_percent <= 100)),
    deposit_received NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (deposit_received >= 0),
    paid_amount NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (paid_amount >= 0),
    status invoice_status NOT NULL DEFAULT 'open',
    ticket_stage ticket_stage NOT NULL DEFAULT 'quoted',
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_invoices_service_ticket ON invoices (service_ticket_id);
CREATE INDEX idx_invoices_customer ON invoices (customer_id);
CREATE INDEX idx_invoices_status ON invoices (status);
";

const DEBTS_SQL: &str = r"
CREATE TABLE debts (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL,
    invoice_id UUID NOT NULL UNIQUE REFERENCES invoices (id),
    total_amount NUMERIC(15, 2) NOT NULL CHECK (total_amount > 0),
    paid_amount NUMERIC(15, 2) NOT NULL DEFAULT 0
        CHECK (paid_amount >= 0 AND paid_amount <= total_amount),
    due_date DATE NOT NULL,
    status debt_status NOT NULL DEFAULT 'outstanding',
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_debts_customer ON debts (customer_id);
CREATE INDEX idx_debts_status_due ON debts (status, due_date);
";

const SETTLEMENT_TRANSACTIONS_SQL: &str = r"
CREATE TABLE settlement_transactions (
    id UUID PRIMARY KEY,
    target_kind settlement_target_kind NOT NULL,
    invoice_id UUID REFERENCES invoices (id),
    debt_id UUID REFERENCES debts (id),
    method payment_method NOT NULL,
    purpose tender_purpose NOT NULL,
    amount NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    status settlement_status NOT NULL,
    gateway_reference TEXT UNIQUE,
    cancellation_overridden BOOLEAN NOT NULL DEFAULT FALSE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Exactly one target per row
    CHECK (
        (target_kind = 'invoice' AND invoice_id IS NOT NULL AND debt_id IS NULL)
        OR (target_kind = 'debt' AND debt_id IS NOT NULL AND invoice_id IS NULL)
    ),
    -- Bank transfers carry a gateway reference; cash never does
    CHECK (
        (method = 'bank_transfer' AND gateway_reference IS NOT NULL)
        OR (method = 'cash' AND gateway_reference IS NULL)
    )
);

CREATE INDEX idx_settlement_tx_invoice ON settlement_transactions (invoice_id);
CREATE INDEX idx_settlement_tx_debt ON settlement_transactions (debt_id);
CREATE INDEX idx_settlement_tx_status ON settlement_transactions (status);
";

const LEDGER_VOUCHERS_SQL: &str = r"
CREATE TABLE ledger_vouchers (
    id UUID PRIMARY KEY,
    kind voucher_kind NOT NULL,
    amount NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    target_name TEXT NOT NULL,
    status voucher_status NOT NULL DEFAULT 'pending',
    created_by UUID NOT NULL,
    approver_id UUID,
    rejection_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- The creator never signs off their own voucher
    CHECK (approver_id IS NULL OR approver_id <> created_by)
);

CREATE INDEX idx_ledger_vouchers_status ON ledger_vouchers (status);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_invoices_updated_at
    BEFORE UPDATE ON invoices
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_debts_updated_at
    BEFORE UPDATE ON debts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_settlement_tx_updated_at
    BEFORE UPDATE ON settlement_transactions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_ledger_vouchers_updated_at
    BEFORE UPDATE ON ledger_vouchers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS settlement_transactions CASCADE;
DROP TABLE IF EXISTS debts CASCADE;
DROP TABLE IF EXISTS ledger_vouchers CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS voucher_status;
DROP TYPE IF EXISTS voucher_kind;
DROP TYPE IF EXISTS debt_status;
DROP TYPE IF EXISTS settlement_target_kind;
DROP TYPE IF EXISTS settlement_status;
DROP TYPE IF EXISTS tender_purpose;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS ticket_stage;
";
