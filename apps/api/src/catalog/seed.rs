/// Schema and seed rows shared by every SQL challenge.
///
/// Seeding is deterministic: the same pair always yields the same queryable
/// state, and each session gets its own freshly seeded database.
#[derive(Debug, Clone, Copy)]
pub struct SeedDataset {
    pub schema: &'static str,
    pub data: &'static str,
}

pub const SAMPLE_DATASET: SeedDataset = SeedDataset {
    schema: SAMPLE_SCHEMA,
    data: SAMPLE_DATA,
};

pub const SAMPLE_SCHEMA: &str = r#"
-- Employees table
CREATE TABLE employees (
    employee_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    department TEXT NOT NULL,
    salary INTEGER NOT NULL,
    hire_date DATE NOT NULL,
    email TEXT NOT NULL UNIQUE
);

-- Products table
CREATE TABLE products (
    product_id INTEGER PRIMARY KEY,
    product_name TEXT NOT NULL,
    category TEXT NOT NULL,
    price DECIMAL(10,2) NOT NULL
);

-- Customers table
CREATE TABLE customers (
    customer_id INTEGER PRIMARY KEY,
    customer_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
);

-- Orders table
CREATE TABLE orders (
    order_id INTEGER PRIMARY KEY,
    customer_id INTEGER,
    product_id INTEGER,
    quantity INTEGER NOT NULL,
    order_date DATE NOT NULL,
    total_amount DECIMAL(10,2),
    FOREIGN KEY (customer_id) REFERENCES customers(customer_id),
    FOREIGN KEY (product_id) REFERENCES products(product_id)
);
"#;

pub const SAMPLE_DATA: &str = r#"
-- Employees
INSERT INTO employees VALUES
(1, 'John', 'Doe', 'Engineering', 120000, '2022-01-15', 'john.doe@company.com'),
(2, 'Jane', 'Smith', 'Engineering', 110000, '2022-03-20', 'jane.smith@company.com'),
(3, 'Bob', 'Johnson', 'Sales', 90000, '2020-11-10', 'bob.johnson@company.com'),
(4, 'Alice', 'Williams', 'Engineering', 105000, '2022-02-01', 'alice.williams@company.com'),
(5, 'Charlie', 'Brown', 'Marketing', 85000, '2021-07-15', 'charlie.brown@company.com'),
(6, 'Diana', 'Davis', 'Engineering', 130000, '2020-09-01', 'diana.davis@company.com'),
(7, 'Eve', 'Wilson', 'Sales', 105000, '2021-12-01', 'eve.wilson@company.com'),
(8, 'Frank', 'Taylor', 'Marketing', 75000, '2022-06-15', 'frank.taylor@company.com'),
(9, 'Grace', 'Anderson', 'Engineering', 115000, '2022-03-10', 'grace.anderson@company.com'),
(10, 'Henry', 'Martinez', 'Sales', 95000, '2021-05-20', 'henry.martinez@company.com');

-- Products
INSERT INTO products VALUES
(1, 'Laptop Pro', 'Electronics', 1299.99),
(2, 'Wireless Mouse', 'Electronics', 49.99),
(3, 'Office Chair', 'Furniture', 399.99),
(4, 'Standing Desk', 'Furniture', 699.99),
(5, 'Notebook Set', 'Stationery', 19.99),
(6, 'Monitor 4K', 'Electronics', 599.99),
(7, 'Desk Lamp', 'Furniture', 79.99),
(8, 'Pen Pack', 'Stationery', 9.99),
(9, 'Keyboard Mechanical', 'Electronics', 199.99),
(10, 'Whiteboard', 'Stationery', 89.99);

-- Customers
INSERT INTO customers VALUES
(1, 'Acme Corp', 'contact@acme.com'),
(2, 'TechStart Inc', 'info@techstart.com'),
(3, 'Global Solutions', 'hello@globalsolutions.com'),
(4, 'Innovation Labs', 'team@innovationlabs.com'),
(5, 'Digital Ventures', 'support@digitalventures.com'),
(6, 'Future Systems', 'hello@futuresystems.com'),
(7, 'Data Analytics Co', 'info@dataanalytics.com');

-- Orders
INSERT INTO orders VALUES
(1, 1, 1, 5, '2023-01-15', 6499.95),
(2, 2, 2, 20, '2023-01-20', 999.80),
(3, 1, 3, 10, '2023-12-05', 3999.90),
(4, 3, 4, 5, '2023-10-15', 3499.95),
(5, 4, 5, 50, '2023-11-20', 999.50),
(6, 5, 6, 3, '2023-12-10', 1799.97),
(7, 1, 7, 15, '2023-12-15', 1199.85),
(8, 2, 8, 100, '2023-10-25', 999.00),
(9, 3, 1, 2, '2023-11-30', 2599.98),
(10, 4, 2, 30, '2023-12-20', 1499.70),
(11, 5, 9, 8, '2023-01-10', 1599.92),
(12, 6, 10, 12, '2023-12-08', 1079.88),
(13, 7, 3, 6, '2023-01-25', 2399.94),
(14, 1, 6, 4, '2023-02-15', 2399.96),
(15, 2, 4, 3, '2023-12-12', 2099.97),
(16, 3, 5, 25, '2023-03-20', 499.75),
(17, 4, 7, 20, '2023-12-18', 1599.80),
(18, 5, 1, 1, '2023-04-10', 1299.99),
(19, 6, 8, 75, '2023-12-22', 748.50),
(20, 7, 2, 15, '2023-05-15', 749.85);
"#;
